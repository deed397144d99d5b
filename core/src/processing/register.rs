use crate::prelude::{
    Capabilities, ConfigError, ConfigResult, Extension, Frame, Processor, ProcessorError,
    ProcessorResult,
};
use crate::processing::macros::{MacroState, ProcessorOptions};
use crate::signal::{SideChannel, Signal, SignalClass};
use std::collections::VecDeque;

/// FIR filter across turns: output `n` is `sum_k c[k] * x[n - k]`, where
/// `x[n - k]` is the signal seen `k` calls ago. Turns before the first call
/// count as zero. The time scale counts the turns processed since the last
/// reset.
#[derive(Debug, Clone)]
pub struct TurnFirFilter {
    coefficients: Vec<f64>,
    /// Previous inputs, most recent first.
    history: VecDeque<Signal>,
    macros: MacroState,
}

impl TurnFirFilter {
    pub fn new(coefficients: Vec<f64>) -> ConfigResult<Self> {
        Self::with_options(coefficients, &ProcessorOptions::default())
    }

    pub fn with_options(coefficients: Vec<f64>, options: &ProcessorOptions) -> ConfigResult<Self> {
        if coefficients.is_empty() {
            return Err(ConfigError::InvalidOption(
                "turn FIR filter needs at least one coefficient".into(),
            ));
        }
        let depth = coefficients.len() - 1;
        Ok(Self {
            coefficients,
            history: VecDeque::with_capacity(depth),
            macros: options.macro_state("TurnFirFilter"),
        })
    }

    pub fn stored_turns(&self) -> usize {
        self.history.len()
    }
}

impl Processor for TurnFirFilter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new(SignalClass::Unstructured, SignalClass::Unstructured)
            .preserving_class()
            .with_extension(Extension::Register)
    }

    fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        let (parameters, signal) = frame.into_parts();
        if let Some(previous) = self.history.front() {
            if previous.len() != signal.len() {
                return Err(ProcessorError::InvalidInput(format!(
                    "signal length changed from {} to {} between turns",
                    previous.len(),
                    signal.len()
                )));
            }
        }

        let mut output = &signal * self.coefficients[0];
        for (coefficient, past) in self.coefficients[1..].iter().zip(self.history.iter()) {
            output.scaled_add(*coefficient, past);
        }

        let depth = self.coefficients.len() - 1;
        if depth > 0 {
            self.history.push_front(signal);
            self.history.truncate(depth);
        }
        self.macros.time_scale += 1.0;

        Ok(Frame::new(parameters, output))
    }

    fn label(&self) -> Option<&str> {
        Some(&self.macros.label)
    }

    fn reset(&mut self) {
        self.history.clear();
        self.macros.time_scale = 0.0;
    }

    fn time_scale(&self) -> f64 {
        self.macros.time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::testing::frame_of;
    use ndarray::array;

    #[test]
    fn filter_combines_previous_turns() {
        let mut stage = TurnFirFilter::new(vec![0.5, 0.25, 0.25]).unwrap();
        let side = SideChannel::new();

        let first = stage.process(frame_of(&[4.0, 8.0]), &side).unwrap();
        assert_eq!(first.signal, array![2.0, 4.0]);

        let second = stage.process(frame_of(&[0.0, 4.0]), &side).unwrap();
        assert_eq!(second.signal, array![1.0, 4.0]);

        let third = stage.process(frame_of(&[0.0, 0.0]), &side).unwrap();
        assert_eq!(third.signal, array![1.0, 3.0]);
        assert_eq!(stage.stored_turns(), 2);
    }

    #[test]
    fn reset_makes_runs_repeatable() {
        let mut stage = TurnFirFilter::new(vec![1.0, -1.0]).unwrap();
        let side = SideChannel::new();

        let fresh = stage.process(frame_of(&[2.0]), &side).unwrap();
        let warm = stage.process(frame_of(&[2.0]), &side).unwrap();
        assert_ne!(fresh, warm);

        stage.reset();
        assert_eq!(stage.stored_turns(), 0);
        assert_eq!(stage.process(frame_of(&[2.0]), &side).unwrap(), fresh);
    }

    #[test]
    fn time_scale_counts_turns_until_reset() {
        let mut stage = TurnFirFilter::new(vec![1.0]).unwrap();
        let side = SideChannel::new();
        assert_eq!(stage.time_scale(), 0.0);

        for _ in 0..3 {
            stage.process(frame_of(&[1.0]), &side).unwrap();
        }
        assert_eq!(stage.time_scale(), 3.0);
        assert_eq!(stage.stored_turns(), 0);

        stage.reset();
        assert_eq!(stage.time_scale(), 0.0);
    }

    #[test]
    fn clones_keep_independent_history() {
        let mut stage = TurnFirFilter::new(vec![0.0, 1.0]).unwrap();
        let side = SideChannel::new();
        stage.process(frame_of(&[5.0]), &side).unwrap();

        let mut copy = stage.clone();
        stage.process(frame_of(&[7.0]), &side).unwrap();

        let from_copy = copy.process(frame_of(&[0.0]), &side).unwrap();
        assert_eq!(from_copy.signal, array![5.0]);
    }

    #[test]
    fn changing_signal_length_is_rejected() {
        let mut stage = TurnFirFilter::new(vec![1.0, 1.0]).unwrap();
        let side = SideChannel::new();
        stage.process(frame_of(&[1.0, 2.0]), &side).unwrap();

        assert!(matches!(
            stage.process(frame_of(&[1.0]), &side),
            Err(ProcessorError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_coefficients_are_rejected() {
        assert!(TurnFirFilter::new(Vec::new()).is_err());
    }
}
