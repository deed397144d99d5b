//! Stage contract implementations, the capability registry and the executor.

pub mod bypass;
pub mod macros;
pub mod multiplication;
pub mod pipeline;
pub mod register;
pub mod registry;
pub mod resampling;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use bypass::Bypass;
pub use macros::{DebugProbe, DebugSnapshot, MacroState, ProcessorOptions};
pub use multiplication::{ChargeNormalization, ChargeWeighter, Gain};
pub use pipeline::{run, Pipeline};
pub use register::TurnFirFilter;
pub use registry::{check_signal_classes, processor_extensions, processor_variables};
pub use resampling::Upsampler;
pub use validation::Validated;
