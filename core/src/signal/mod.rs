//! Data flowing through a pipeline: the sample array and the metadata that
//! maps it onto physical bins and segments.

pub mod bins;
pub mod bunch;
pub mod parameters;
pub mod side_channel;

pub use bunch::{SliceSet, N_MACROPARTICLES_PER_SLICE, Z_BINS};
pub use parameters::{Parameters, SignalClass};
pub use side_channel::{SideChannel, SLICE_SETS};

/// Ordered samples; physical meaning comes from the accompanying [`Parameters`].
pub type Signal = ndarray::Array1<f64>;
