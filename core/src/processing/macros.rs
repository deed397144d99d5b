//! Construction-time decoration shared by every processor.
//!
//! Labels and the `time_scale` slot live in [`MacroState`], embedded in each
//! processor. Debug capture is a separate wrapper, [`DebugProbe`], so the
//! wrapped processor never knows it is being observed.

use crate::prelude::{Capabilities, Extension, Frame, Processor, ProcessorResult};
use crate::signal::{Parameters, SideChannel, Signal};
use serde::{Deserialize, Serialize};

/// Options understood by every processor constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorOptions {
    pub label: Option<String>,
    pub debug: bool,
}

impl ProcessorOptions {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Per-instance state, falling back to `default_label` when unlabelled.
    pub fn macro_state(&self, default_label: &str) -> MacroState {
        MacroState {
            label: self
                .label
                .clone()
                .unwrap_or_else(|| default_label.to_string()),
            time_scale: 0.0,
        }
    }

    /// Boxes `processor`, wrapped in a [`DebugProbe`] only when `debug` is set.
    pub fn build<P>(&self, processor: P) -> Box<dyn Processor>
    where
        P: Processor + Clone + 'static,
    {
        if self.debug {
            Box::new(DebugProbe::new(processor))
        } else {
            Box::new(processor)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroState {
    pub label: String,
    /// Scalar kept across calls, e.g. accumulated timing drift.
    pub time_scale: f64,
}

/// Independent copies of what went into and came out of the last call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugSnapshot {
    pub input: Frame,
    pub output: Frame,
}

impl DebugSnapshot {
    pub fn input_parameters(&self) -> &Parameters {
        &self.input.parameters
    }

    pub fn input_signal(&self) -> &Signal {
        &self.input.signal
    }

    pub fn output_parameters(&self) -> &Parameters {
        &self.output.parameters
    }

    pub fn output_signal(&self) -> &Signal {
        &self.output.signal
    }
}

/// Records a [`DebugSnapshot`] around every call of the wrapped processor
/// and otherwise behaves exactly like it.
#[derive(Debug, Clone)]
pub struct DebugProbe<P> {
    inner: P,
    snapshot: Option<DebugSnapshot>,
}

impl<P> DebugProbe<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            snapshot: None,
        }
    }

    pub fn snapshot(&self) -> Option<&DebugSnapshot> {
        self.snapshot.as_ref()
    }
}

impl<P> Processor for DebugProbe<P>
where
    P: Processor + Clone + 'static,
{
    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities().with_extension(Extension::Debug)
    }

    fn process(&mut self, frame: Frame, side: &SideChannel) -> ProcessorResult<Frame> {
        let input = frame.clone();
        let output = self.inner.process(frame, side)?;
        self.snapshot = Some(DebugSnapshot {
            input,
            output: output.clone(),
        });
        Ok(output)
    }

    fn label(&self) -> Option<&str> {
        self.inner.label()
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.snapshot = None;
    }

    fn debug_snapshot(&self) -> Option<&DebugSnapshot> {
        self.snapshot()
    }

    fn time_scale(&self) -> f64 {
        self.inner.time_scale()
    }
}
