use crate::prelude::{
    Capabilities, ConfigError, ConfigResult, Frame, Processor, ProcessorError, ProcessorResult,
};
use crate::processing::macros::{MacroState, ProcessorOptions};
use crate::signal::{SideChannel, SignalClass};
use ndarray::{Array1, Array2};

/// Zero-order-hold upsampling by an integer factor.
///
/// Every bin is split into `factor` equal sub-bins carrying the original
/// value. The input layout is appended to the parameter history.
#[derive(Debug, Clone)]
pub struct Upsampler {
    factor: usize,
    macros: MacroState,
}

impl Upsampler {
    pub fn new(factor: usize) -> ConfigResult<Self> {
        Self::with_options(factor, &ProcessorOptions::default())
    }

    pub fn with_options(factor: usize, options: &ProcessorOptions) -> ConfigResult<Self> {
        if factor == 0 {
            return Err(ConfigError::InvalidOption(
                "upsampling factor must be at least 1".into(),
            ));
        }
        Ok(Self {
            factor,
            macros: options.macro_state("Upsampler"),
        })
    }
}

impl Processor for Upsampler {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new(SignalClass::Segmented, SignalClass::Segmented).preserving_class()
    }

    fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        let (input, signal) = frame.into_parts();
        if input.n_bins() != signal.len() {
            return Err(ProcessorError::InvalidInput(format!(
                "{} bin edges for {} samples",
                input.n_bins(),
                signal.len()
            )));
        }

        let factor = self.factor;
        let edges = &input.bin_edges;
        let bin_edges = Array2::from_shape_fn((edges.nrows() * factor, 2), |(i, j)| {
            let (bin, sub) = (i / factor, i % factor);
            let width = (edges[[bin, 1]] - edges[[bin, 0]]) / factor as f64;
            edges[[bin, 0]] + (sub + j) as f64 * width
        });
        let output_signal = Array1::from_shape_fn(signal.len() * factor, |i| signal[i / factor]);

        let mut output = input.clone();
        output.push_history(&input);
        output.bin_edges = bin_edges;
        output.n_bins_per_segment = input.n_bins_per_segment * factor;

        Ok(Frame::new(output, output_signal))
    }

    fn label(&self) -> Option<&str> {
        Some(&self.macros.label)
    }
}
