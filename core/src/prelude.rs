use crate::processing::macros::DebugSnapshot;
use crate::signal::{Parameters, SideChannel, Signal, SignalClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Payload handed from one stage to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub parameters: Parameters,
    pub signal: Signal,
}

impl Frame {
    pub fn new(parameters: Parameters, signal: Signal) -> Self {
        Self { parameters, signal }
    }

    pub fn into_parts(self) -> (Parameters, Signal) {
        (self.parameters, self.signal)
    }
}

/// Optional capability a processor opts into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Extension {
    /// Per-bunch statistics from the signal source.
    Bunch,
    /// Input/output snapshots for inspection.
    Debug,
    Register,
    Combiner,
    /// Identifier not known to the core, surfaced unchanged.
    Custom(String),
}

impl Extension {
    pub fn as_str(&self) -> &str {
        match self {
            Extension::Bunch => "bunch",
            Extension::Debug => "debug",
            Extension::Register => "register",
            Extension::Combiner => "combiner",
            Extension::Custom(name) => name,
        }
    }
}

impl From<&str> for Extension {
    fn from(name: &str) -> Self {
        match name {
            "bunch" => Extension::Bunch,
            "debug" => Extension::Debug,
            "register" => Extension::Register,
            "combiner" => Extension::Combiner,
            other => Extension::Custom(other.to_string()),
        }
    }
}

impl From<String> for Extension {
    fn from(name: String) -> Self {
        Extension::from(name.as_str())
    }
}

impl From<Extension> for String {
    fn from(extension: Extension) -> Self {
        extension.as_str().to_string()
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a processor declares about itself.
///
/// `required_variables` is only meaningful with [`Extension::Bunch`]; a
/// bunch-aware processor returning `None` there is a configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Accepted input class and guaranteed output class.
    pub signal_classes: (SignalClass, SignalClass),
    /// The stage leaves the bin layout as it found it, so its output keeps
    /// the class of its input.
    pub preserves_class: bool,
    pub extensions: BTreeSet<Extension>,
    pub required_variables: Option<BTreeSet<String>>,
}

impl Capabilities {
    pub fn new(input: SignalClass, output: SignalClass) -> Self {
        Self {
            signal_classes: (input, output),
            preserves_class: false,
            extensions: BTreeSet::new(),
            required_variables: None,
        }
    }

    pub fn preserving_class(mut self) -> Self {
        self.preserves_class = true;
        self
    }

    /// Class of the output given the class of the input.
    pub fn emitted_class(&self, incoming: SignalClass) -> SignalClass {
        if self.preserves_class {
            incoming.max(self.signal_classes.1)
        } else {
            self.signal_classes.1
        }
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extensions.insert(extension);
        self
    }

    pub fn with_required_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_variables = Some(variables.into_iter().map(Into::into).collect());
        self
    }

    pub fn declares(&self, extension: &Extension) -> bool {
        self.extensions.contains(extension)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new(SignalClass::Unstructured, SignalClass::Unstructured)
    }
}

/// Failure raised by a stage while processing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProcessorError {
    #[error("missing side-channel data: {0}")]
    MissingSideChannel(String),
    #[error("bunch {bunch} provides no statistic '{name}'")]
    MissingStatistic { bunch: usize, name: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("layout mismatch after {stage}: {detail}")]
    LayoutMismatch { stage: String, detail: String },
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type ProcessorResult<T> = Result<T, ProcessorError>;

/// Failure detected while assembling a pipeline, before any processing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("processor {processor} declares the bunch extension without required variables")]
    MissingRequiredVariables { processor: String },
    #[error(
        "processor {processor} at position {index} accepts class {expected} or higher but receives class {found}"
    )]
    IncompatibleSignalClass {
        index: usize,
        processor: String,
        expected: SignalClass,
        found: SignalClass,
    },
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contract implemented by every pipeline stage.
///
/// Stages may keep private state between calls; the executor never looks at
/// it. `side` is shared read-only by all stages of a run.
pub trait Processor: ProcessorClone + Send {
    fn capabilities(&self) -> Capabilities;
    fn process(&mut self, frame: Frame, side: &SideChannel) -> ProcessorResult<Frame>;

    fn label(&self) -> Option<&str> {
        None
    }

    /// Clears private state so repeated runs are deterministic.
    fn reset(&mut self) {}

    fn debug_snapshot(&self) -> Option<&DebugSnapshot> {
        None
    }

    /// Scalar the stage carries across calls. Zero until the stage advances it.
    fn time_scale(&self) -> f64 {
        0.0
    }
}

/// Deep copy of a boxed processor, private state included.
pub trait ProcessorClone {
    fn clone_box(&self) -> Box<dyn Processor>;
}

impl<T> ProcessorClone for T
where
    T: Processor + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn Processor> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Processor> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

/// Name used in diagnostics: the label when present, the position otherwise.
pub fn processor_name(processor: &dyn Processor, index: usize) -> String {
    match processor.label() {
        Some(label) => label.to_string(),
        None => format!("#{}", index),
    }
}
