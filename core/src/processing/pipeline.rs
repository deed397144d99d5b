use crate::prelude::{
    processor_name, ConfigResult, Extension, Frame, Processor, ProcessorResult,
};
use crate::processing::macros::DebugSnapshot;
use crate::processing::registry;
use crate::signal::{SideChannel, SignalClass};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use std::collections::BTreeSet;

/// Threads `frame` through `processors` in order, handing every stage the
/// same `side` bundle. The first failure is returned as is and the remaining
/// stages are not called. An empty list returns `frame` unchanged.
pub fn run(
    frame: Frame,
    processors: &mut [Box<dyn Processor>],
    side: &SideChannel,
) -> ProcessorResult<Frame> {
    run_observed(frame, processors, side, |_, _, _, _| {})
}

/// Same fold as [`run`], calling `observe(index, processor, samples_in, output)`
/// after every stage that succeeds.
fn run_observed<F>(
    frame: Frame,
    processors: &mut [Box<dyn Processor>],
    side: &SideChannel,
    mut observe: F,
) -> ProcessorResult<Frame>
where
    F: FnMut(usize, &dyn Processor, usize, &Frame),
{
    processors
        .iter_mut()
        .enumerate()
        .try_fold(frame, |frame, (index, processor)| {
            let samples_in = frame.signal.len();
            let output = processor.process(frame, side)?;
            observe(index, &**processor, samples_in, &output);
            Ok(output)
        })
}

/// An ordered processor list together with what the registry found in it.
///
/// Cloning deep-copies every processor, so each copy can be driven
/// independently (one per transverse plane, for instance).
#[derive(Clone)]
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
    extensions: BTreeSet<Extension>,
    required_variables: BTreeSet<String>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Pipeline {
    pub fn new(processors: Vec<Box<dyn Processor>>) -> ConfigResult<Self> {
        Self::with_external_extensions(processors, &BTreeSet::new())
    }

    pub fn with_external_extensions(
        processors: Vec<Box<dyn Processor>>,
        external: &BTreeSet<Extension>,
    ) -> ConfigResult<Self> {
        let extensions = registry::processor_extensions(&processors, Some(external));
        let required_variables = registry::processor_variables(&processors, None)?;

        let logger = LogManager::new();
        logger.record(&format!(
            "pipeline assembled: {} processors, extensions [{}], bunch variables [{}]",
            processors.len(),
            join(extensions.iter().map(Extension::as_str)),
            join(required_variables.iter().map(String::as_str)),
        ));

        Ok(Self {
            processors,
            extensions,
            required_variables,
            metrics: MetricsRecorder::new(),
            logger,
        })
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn processors(&self) -> &[Box<dyn Processor>] {
        &self.processors
    }

    pub fn extensions(&self) -> &BTreeSet<Extension> {
        &self.extensions
    }

    pub fn supports(&self, extension: &Extension) -> bool {
        self.extensions.contains(extension)
    }

    /// Statistics the signal source has to compute for each bunch.
    pub fn required_variables(&self) -> &BTreeSet<String> {
        &self.required_variables
    }

    /// Checks class chaining for signals entering with class `input` and
    /// returns the class of the final output.
    pub fn validate(&self, input: SignalClass) -> ConfigResult<SignalClass> {
        registry::check_signal_classes(&self.processors, input)
    }

    pub fn run(&mut self, frame: Frame, side: &SideChannel) -> ProcessorResult<Frame> {
        let metrics = &self.metrics;
        let logger = self.logger;
        metrics.record_run();

        run_observed(frame, &mut self.processors, side, |index, processor, samples_in, output| {
            metrics.record_stage_call();
            logger.trace_stage(
                index,
                &processor_name(processor, index),
                samples_in,
                output.signal.len(),
            );
        })
        .map_err(|err| {
            metrics.record_failure();
            err
        })
    }

    /// Clears the private state of every processor.
    pub fn reset(&mut self) {
        for processor in &mut self.processors {
            processor.reset();
        }
    }

    /// Snapshots of the debug-enabled processors that have run, by name.
    pub fn debug_snapshots(&self) -> impl Iterator<Item = (String, &DebugSnapshot)> + '_ {
        self.processors
            .iter()
            .enumerate()
            .filter_map(|(index, processor)| {
                processor
                    .debug_snapshot()
                    .map(|snapshot| (processor_name(processor.as_ref(), index), snapshot))
            })
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn join<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
