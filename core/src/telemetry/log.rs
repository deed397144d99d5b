use log::{debug, info};

/// Thin wrapper over the `log` facade shared by the pipeline components.
#[derive(Debug, Clone, Copy)]
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    /// Per-stage trace; emitted at debug level since it fires every call.
    pub fn trace_stage(&self, index: usize, name: &str, samples_in: usize, samples_out: usize) {
        debug!(
            "stage {} ({}) processed {} -> {} samples",
            index, name, samples_in, samples_out
        );
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
