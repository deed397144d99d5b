//! Signal-processing pipeline core for modelling feedback system hardware.
//!
//! A signal is a sample array plus [`Parameters`] describing its bins. It is
//! passed through an ordered list of [`Processor`]s, each of which may read
//! the shared [`SideChannel`] and returns a new frame. The registry in
//! [`processing::registry`] tells a signal source which extensions and bunch
//! statistics a pipeline needs before the first run.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod signal;
pub mod telemetry;

pub use prelude::{
    Capabilities, ConfigError, ConfigResult, Extension, Frame, Processor, ProcessorError,
    ProcessorResult,
};
pub use processing::{Pipeline, ProcessorOptions};
pub use signal::{Parameters, SideChannel, Signal, SignalClass, SliceSet};
