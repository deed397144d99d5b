use crate::prelude::{Capabilities, Frame, Processor, ProcessorResult};
use crate::processing::macros::{MacroState, ProcessorOptions};
use crate::signal::SideChannel;

/// Passes the signal through untouched. Reference implementation of the
/// processor contract.
#[derive(Debug, Clone)]
pub struct Bypass {
    macros: MacroState,
}

impl Bypass {
    pub fn new() -> Self {
        Self::with_options(&ProcessorOptions::default())
    }

    pub fn with_options(options: &ProcessorOptions) -> Self {
        Self {
            macros: options.macro_state("Bypass"),
        }
    }
}

impl Default for Bypass {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for Bypass {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default().preserving_class()
    }

    fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        Ok(frame)
    }

    fn label(&self) -> Option<&str> {
        Some(&self.macros.label)
    }
}
