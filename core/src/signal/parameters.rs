use crate::prelude::{ConfigError, ConfigResult};
use crate::signal::bins::{bin_widths, z_bins_to_bin_edges};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

const WIDTH_TOLERANCE: f64 = 1e-9;

/// Structural guarantee a signal offers about its bin layout.
///
/// Classes are ordered: a stage written for a lower class also accepts
/// signals of every higher class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SignalClass {
    /// No assumptions about spacing or width.
    Unstructured = 0,
    /// Equal segments with equally spaced bins, possibly separated by gaps.
    Segmented = 1,
    /// Equally spaced and contiguous over the whole signal.
    Uniform = 2,
}

impl SignalClass {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn accepts(self, incoming: SignalClass) -> bool {
        incoming >= self
    }
}

impl TryFrom<u8> for SignalClass {
    type Error = ConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(SignalClass::Unstructured),
            1 => Ok(SignalClass::Segmented),
            2 => Ok(SignalClass::Uniform),
            other => Err(ConfigError::InvalidOption(format!(
                "signal class must be 0, 1 or 2, got {}",
                other
            ))),
        }
    }
}

impl From<SignalClass> for u8 {
    fn from(class: SignalClass) -> Self {
        class.level()
    }
}

impl fmt::Display for SignalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Metadata describing how a signal maps onto physical bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub class: SignalClass,
    /// `(n, 2)` table of bin start/end positions, one row per sample.
    pub bin_edges: Array2<f64>,
    pub n_segments: usize,
    pub n_bins_per_segment: usize,
    /// One reference position per segment.
    pub segment_ref_points: Array1<f64>,
    /// Earlier layouts of this signal, oldest first. Only ever appended to.
    #[serde(default)]
    pub previous_parameters: Vec<Parameters>,
    /// Betatron phase of the signal source.
    pub location: f64,
    /// Beta function at the source; 1.0 is neutral.
    pub beta: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            class: SignalClass::Unstructured,
            bin_edges: Array2::zeros((0, 2)),
            n_segments: 0,
            n_bins_per_segment: 0,
            segment_ref_points: Array1::zeros(0),
            previous_parameters: Vec::new(),
            location: 0.0,
            beta: 1.0,
        }
    }
}

impl Parameters {
    /// Neutral starting record: class 0, no bins, no history.
    pub fn prototype() -> Self {
        Self::default()
    }

    /// Equally binned segments centred on multiples of `segment_spacing`.
    ///
    /// The result is class 2 when the segments touch and class 1 otherwise.
    pub fn uniform(
        n_segments: usize,
        n_bins_per_segment: usize,
        bin_width: f64,
        segment_spacing: f64,
    ) -> ConfigResult<Self> {
        if n_segments == 0 || n_bins_per_segment == 0 {
            return Err(ConfigError::InvalidOption(
                "segment and bin counts must be positive".into(),
            ));
        }
        if !(bin_width > 0.0) {
            return Err(ConfigError::InvalidOption(format!(
                "bin width must be positive, got {}",
                bin_width
            )));
        }

        let segment_length = n_bins_per_segment as f64 * bin_width;
        if n_segments > 1 && segment_spacing < segment_length * (1.0 - WIDTH_TOLERANCE) {
            return Err(ConfigError::InvalidOption(format!(
                "segment spacing {} is shorter than segment length {}",
                segment_spacing, segment_length
            )));
        }

        let contiguous = n_segments == 1
            || (segment_spacing - segment_length).abs() <= WIDTH_TOLERANCE * segment_length;
        let half = segment_length / 2.0;

        let mut bin_edges = Array2::zeros((n_segments * n_bins_per_segment, 2));
        let segment_ref_points =
            Array1::from_shape_fn(n_segments, |segment| segment as f64 * segment_spacing);
        for segment in 0..n_segments {
            let z_bins = Array1::from_shape_fn(n_bins_per_segment + 1, |j| {
                segment_ref_points[segment] - half + j as f64 * bin_width
            });
            let offset = segment * n_bins_per_segment;
            bin_edges
                .slice_mut(ndarray::s![offset..offset + n_bins_per_segment, ..])
                .assign(&z_bins_to_bin_edges(&z_bins));
        }

        Ok(Self {
            class: if contiguous {
                SignalClass::Uniform
            } else {
                SignalClass::Segmented
            },
            bin_edges,
            n_segments,
            n_bins_per_segment,
            segment_ref_points,
            ..Self::default()
        })
    }

    pub fn n_bins(&self) -> usize {
        self.bin_edges.nrows()
    }

    /// Appends `previous` to the history. The stored copy carries no history
    /// of its own, the chain lives only at the top level.
    pub fn push_history(&mut self, previous: &Parameters) {
        let mut snapshot = previous.clone();
        snapshot.previous_parameters.clear();
        self.previous_parameters.push(snapshot);
    }

    /// Checks that the layout honours the guarantees of its class for a
    /// signal of `signal_len` samples.
    pub fn check_consistency(&self, signal_len: usize) -> Result<(), String> {
        if self.bin_edges.ncols() != 2 {
            return Err(format!(
                "bin edge table has {} columns instead of 2",
                self.bin_edges.ncols()
            ));
        }
        if self.class == SignalClass::Unstructured {
            return Ok(());
        }

        if self.n_bins() != signal_len {
            return Err(format!(
                "{} bin edges for {} samples",
                self.n_bins(),
                signal_len
            ));
        }
        if self.n_segments * self.n_bins_per_segment != self.n_bins() {
            return Err(format!(
                "{} segments of {} bins do not cover {} bins",
                self.n_segments,
                self.n_bins_per_segment,
                self.n_bins()
            ));
        }
        if self.segment_ref_points.len() != self.n_segments {
            return Err(format!(
                "{} reference points for {} segments",
                self.segment_ref_points.len(),
                self.n_segments
            ));
        }

        let widths = bin_widths(&self.bin_edges);
        if let Some(&reference) = widths.iter().next() {
            let tolerance = WIDTH_TOLERANCE * reference.abs();
            if let Some(bin) = widths.iter().position(|w| (w - reference).abs() > tolerance) {
                return Err(format!(
                    "bin {} has width {} instead of {}",
                    bin, widths[bin], reference
                ));
            }
        }

        if self.class == SignalClass::Uniform {
            for bin in 1..self.n_bins() {
                let gap = self.bin_edges[[bin, 0]] - self.bin_edges[[bin - 1, 1]];
                if gap.abs() > WIDTH_TOLERANCE * widths[bin].abs() {
                    return Err(format!("gap of {} before bin {}", gap, bin));
                }
            }
        }

        Ok(())
    }
}
