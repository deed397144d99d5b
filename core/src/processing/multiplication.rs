use crate::math::stats::StatsHelper;
use crate::prelude::{Capabilities, Extension, Frame, Processor, ProcessorError, ProcessorResult};
use crate::processing::macros::{MacroState, ProcessorOptions};
use crate::signal::{SideChannel, SignalClass, N_MACROPARTICLES_PER_SLICE};
use ndarray::s;
use serde::{Deserialize, Serialize};

/// Multiplies every sample by a constant.
#[derive(Debug, Clone)]
pub struct Gain {
    factor: f64,
    macros: MacroState,
}

impl Gain {
    pub fn new(factor: f64) -> Self {
        Self::with_options(factor, &ProcessorOptions::default())
    }

    pub fn with_options(factor: f64, options: &ProcessorOptions) -> Self {
        Self {
            factor,
            macros: options.macro_state("Gain"),
        }
    }
}

impl Processor for Gain {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default().preserving_class()
    }

    fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        let (parameters, signal) = frame.into_parts();
        Ok(Frame::new(parameters, signal * self.factor))
    }

    fn label(&self) -> Option<&str> {
        Some(&self.macros.label)
    }
}

/// How per-slice charge is turned into a weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeNormalization {
    /// Slice charge over the bunch total.
    #[default]
    Total,
    /// Slice charge over the mean slice charge of the bunch.
    SegmentAverage,
}

/// Weights each segment by the macroparticle count of the matching bunch
/// slices.
///
/// A bunch with zero total charge has nothing to normalize by; its segment
/// is set to zero instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct ChargeWeighter {
    normalization: ChargeNormalization,
    macros: MacroState,
}

impl ChargeWeighter {
    pub fn new(normalization: ChargeNormalization) -> Self {
        Self::with_options(normalization, &ProcessorOptions::default())
    }

    pub fn with_options(normalization: ChargeNormalization, options: &ProcessorOptions) -> Self {
        Self {
            normalization,
            macros: options.macro_state("ChargeWeighter"),
        }
    }
}

impl Processor for ChargeWeighter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new(SignalClass::Unstructured, SignalClass::Unstructured)
            .preserving_class()
            .with_extension(Extension::Bunch)
            .with_required_variables([N_MACROPARTICLES_PER_SLICE])
    }

    fn process(&mut self, frame: Frame, side: &SideChannel) -> ProcessorResult<Frame> {
        let (parameters, mut signal) = frame.into_parts();
        let n_bins = parameters.n_bins_per_segment;
        let n_bunches = side.slice_sets()?.len();

        if n_bunches != parameters.n_segments {
            return Err(ProcessorError::InvalidInput(format!(
                "{} bunches for {} segments",
                n_bunches, parameters.n_segments
            )));
        }
        if signal.len() != n_bunches * n_bins {
            return Err(ProcessorError::InvalidInput(format!(
                "{} samples do not split into {} segments of {} bins",
                signal.len(),
                n_bunches,
                n_bins
            )));
        }

        for bunch in 0..n_bunches {
            let charge = side.bunch_statistic(bunch, N_MACROPARTICLES_PER_SLICE)?;
            if charge.len() != n_bins {
                return Err(ProcessorError::InvalidInput(format!(
                    "bunch {} has {} slices, segment has {} bins",
                    bunch,
                    charge.len(),
                    n_bins
                )));
            }

            let norm = match self.normalization {
                ChargeNormalization::Total => charge.sum(),
                ChargeNormalization::SegmentAverage => StatsHelper::mean(charge),
            };
            let mut segment = signal.slice_mut(s![bunch * n_bins..(bunch + 1) * n_bins]);
            if norm == 0.0 {
                segment.fill(0.0);
            } else {
                segment *= &(&charge / norm);
            }
        }

        Ok(Frame::new(parameters, signal))
    }

    fn label(&self) -> Option<&str> {
        Some(&self.macros.label)
    }
}
