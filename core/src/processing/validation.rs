use crate::prelude::{Capabilities, Frame, Processor, ProcessorError, ProcessorResult};
use crate::processing::macros::DebugSnapshot;
use crate::signal::SideChannel;

/// Opt-in check that a stage keeps its output layout consistent.
///
/// The executor never validates shapes between stages; wrap a processor in
/// this type while testing it.
#[derive(Debug, Clone)]
pub struct Validated<P> {
    inner: P,
}

impl<P> Validated<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P> Processor for Validated<P>
where
    P: Processor + Clone + 'static,
{
    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn process(&mut self, frame: Frame, side: &SideChannel) -> ProcessorResult<Frame> {
        let history_len = frame.parameters.previous_parameters.len();
        let output = self.inner.process(frame, side)?;
        let stage = || self.inner.label().unwrap_or("unlabelled").to_string();

        let (_, promised) = self.inner.capabilities().signal_classes;
        if output.parameters.class < promised {
            return Err(ProcessorError::LayoutMismatch {
                stage: stage(),
                detail: format!(
                    "emitted class {} but declares class {}",
                    output.parameters.class, promised
                ),
            });
        }
        if output.parameters.previous_parameters.len() < history_len {
            return Err(ProcessorError::LayoutMismatch {
                stage: stage(),
                detail: "parameter history was truncated".into(),
            });
        }
        output
            .parameters
            .check_consistency(output.signal.len())
            .map_err(|detail| ProcessorError::LayoutMismatch {
                stage: stage(),
                detail,
            })?;

        Ok(output)
    }

    fn label(&self) -> Option<&str> {
        self.inner.label()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn debug_snapshot(&self) -> Option<&DebugSnapshot> {
        self.inner.debug_snapshot()
    }

    fn time_scale(&self) -> f64 {
        self.inner.time_scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Frame;
    use crate::processing::testing::frame_of;
    use crate::processing::{Bypass, Upsampler};
    use crate::signal::{Parameters, SignalClass};
    use ndarray::{array, Array1};

    #[derive(Debug, Clone)]
    struct Truncating;

    impl Processor for Truncating {
        fn capabilities(&self) -> Capabilities {
            Capabilities::default()
        }

        fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
            Ok(Frame::new(frame.parameters, array![0.0]))
        }
    }

    /// Drops whatever parameter history it receives.
    #[derive(Debug, Clone)]
    struct Forgetful;

    impl Processor for Forgetful {
        fn capabilities(&self) -> Capabilities {
            Capabilities::default().preserving_class()
        }

        fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
            let (mut parameters, signal) = frame.into_parts();
            parameters.previous_parameters.clear();
            Ok(Frame::new(parameters, signal))
        }
    }

    /// Promises a segmented layout but hands back an unstructured one.
    #[derive(Debug, Clone)]
    struct Flattening;

    impl Processor for Flattening {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new(SignalClass::Segmented, SignalClass::Segmented)
        }

        fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
            let (mut parameters, signal) = frame.into_parts();
            parameters.class = SignalClass::Unstructured;
            Ok(Frame::new(parameters, signal))
        }
    }

    /// Doubles the width of the last bin.
    #[derive(Debug, Clone)]
    struct Stretching;

    impl Processor for Stretching {
        fn capabilities(&self) -> Capabilities {
            Capabilities::default().preserving_class()
        }

        fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
            let (mut parameters, signal) = frame.into_parts();
            let last = parameters.n_bins() - 1;
            let width = parameters.bin_edges[[last, 1]] - parameters.bin_edges[[last, 0]];
            parameters.bin_edges[[last, 1]] += width;
            Ok(Frame::new(parameters, signal))
        }
    }

    fn detail_of(err: ProcessorError) -> String {
        match err {
            ProcessorError::LayoutMismatch { detail, .. } => detail,
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn well_behaved_stages_pass_through() {
        let side = SideChannel::new();
        let mut bypass = Validated::new(Bypass::new());
        let mut upsampler = Validated::new(Upsampler::new(3).unwrap());

        let frame = bypass.process(frame_of(&[1.0, 2.0]), &side).unwrap();
        let frame = upsampler.process(frame, &side).unwrap();
        assert_eq!(frame.signal.len(), 6);
        assert_eq!(upsampler.label(), Some("Upsampler"));
    }

    #[test]
    fn length_changes_without_new_edges_are_flagged() {
        let mut stage = Validated::new(Truncating);
        let err = stage
            .process(frame_of(&[1.0, 2.0]), &SideChannel::new())
            .unwrap_err();

        match err {
            ProcessorError::LayoutMismatch { stage, detail } => {
                assert_eq!(stage, "unlabelled");
                assert!(detail.contains("2 bin edges for 1 samples"), "{}", detail);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn truncated_history_is_flagged() {
        let mut frame = frame_of(&[1.0, 2.0]);
        let earlier = frame.parameters.clone();
        frame.parameters.push_history(&earlier);

        let err = Validated::new(Forgetful)
            .process(frame, &SideChannel::new())
            .unwrap_err();
        assert!(detail_of(err).contains("truncated"));
    }

    #[test]
    fn emitting_a_lower_class_than_declared_is_flagged() {
        let err = Validated::new(Flattening)
            .process(frame_of(&[1.0, 2.0]), &SideChannel::new())
            .unwrap_err();
        let detail = detail_of(err);
        assert!(detail.contains("emitted class 0"), "{}", detail);
    }

    #[test]
    fn unequal_widths_are_flagged_at_picosecond_scale() {
        let side = SideChannel::new();
        let width = 2.5e-11;
        let segmented = Parameters::uniform(2, 4, width, 2.5e-8).unwrap();
        let contiguous = Parameters::uniform(1, 4, width, 0.0).unwrap();

        let mut bypass = Validated::new(Bypass::new());
        assert!(bypass
            .process(Frame::new(segmented.clone(), Array1::zeros(8)), &side)
            .is_ok());

        let mut stage = Validated::new(Stretching);
        for parameters in [segmented, contiguous] {
            let n = parameters.n_bins();
            let err = stage
                .process(Frame::new(parameters, Array1::zeros(n)), &side)
                .unwrap_err();
            assert!(detail_of(err).contains("has width"));
        }
    }
}
