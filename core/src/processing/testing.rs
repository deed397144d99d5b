//! Small processors shared by the unit tests of this module.

use crate::prelude::{Capabilities, Frame, Processor, ProcessorError, ProcessorResult};
use crate::signal::{bins::z_bins_to_bin_edges, Parameters, SideChannel, SignalClass};
use ndarray::Array1;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Single segment of unit bins starting at zero, class 1.
pub fn frame_of(samples: &[f64]) -> Frame {
    let n = samples.len();
    let parameters = Parameters {
        class: SignalClass::Segmented,
        bin_edges: z_bins_to_bin_edges(&Array1::from_shape_fn(n + 1, |i| i as f64)),
        n_segments: 1,
        n_bins_per_segment: n,
        segment_ref_points: Array1::from(vec![n as f64 / 2.0]),
        ..Parameters::default()
    };
    Frame::new(parameters, Array1::from(samples.to_vec()))
}

#[derive(Debug, Clone)]
pub struct Scale {
    factor: f64,
}

impl Scale {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Processor for Scale {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        Ok(Frame::new(frame.parameters, frame.signal * self.factor))
    }
}

#[derive(Debug, Clone)]
pub struct Offset {
    shift: f64,
}

impl Offset {
    pub fn new(shift: f64) -> Self {
        Self { shift }
    }
}

impl Processor for Offset {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        Ok(Frame::new(frame.parameters, frame.signal + self.shift))
    }
}

#[derive(Debug, Clone)]
pub struct Failing;

impl Processor for Failing {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn process(&mut self, _frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        Err(ProcessorError::Internal("deliberate failure".into()))
    }
}

/// Counts its invocations through a shared counter.
#[derive(Debug, Clone, Default)]
pub struct Counting {
    pub calls: Arc<AtomicUsize>,
}

impl Counting {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Processor for Counting {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(frame)
    }
}

/// Identity stage that reports whatever capabilities it was given.
#[derive(Debug, Clone)]
pub struct Declaring {
    capabilities: Capabilities,
}

impl Declaring {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }
}

impl Processor for Declaring {
    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    fn process(&mut self, frame: Frame, _side: &SideChannel) -> ProcessorResult<Frame> {
        Ok(frame)
    }
}
