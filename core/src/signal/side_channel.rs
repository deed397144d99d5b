use crate::prelude::{ProcessorError, ProcessorResult};
use crate::signal::bunch::SliceSet;
use ndarray::{Array1, ArrayView1};
use std::collections::BTreeMap;

/// Reserved key for the per-bunch statistics.
pub const SLICE_SETS: &str = "slice_sets";

/// Auxiliary data supplied by the signal source and shared read-only by every
/// stage of a run. Lookups of absent keys fail, they never fall back to a
/// default.
#[derive(Debug, Clone, Default)]
pub struct SideChannel {
    slice_sets: Option<Vec<SliceSet>>,
    values: BTreeMap<String, Array1<f64>>,
}

impl SideChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slice_sets(mut self, slice_sets: Vec<SliceSet>) -> Self {
        self.slice_sets = Some(slice_sets);
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, values: Array1<f64>) -> Self {
        self.insert(key, values);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, values: Array1<f64>) {
        self.values.insert(key.into(), values);
    }

    pub fn slice_sets(&self) -> ProcessorResult<&[SliceSet]> {
        self.slice_sets
            .as_deref()
            .ok_or_else(|| ProcessorError::MissingSideChannel(SLICE_SETS.into()))
    }

    pub fn bunch_statistic(&self, bunch: usize, name: &str) -> ProcessorResult<ArrayView1<'_, f64>> {
        let slice_sets = self.slice_sets()?;
        let slice_set = slice_sets.get(bunch).ok_or_else(|| {
            ProcessorError::MissingSideChannel(format!(
                "{}[{}] (only {} bunches)",
                SLICE_SETS,
                bunch,
                slice_sets.len()
            ))
        })?;
        slice_set
            .statistic(name)
            .ok_or_else(|| ProcessorError::MissingStatistic {
                bunch,
                name: name.to_string(),
            })
    }

    pub fn get(&self, key: &str) -> ProcessorResult<ArrayView1<'_, f64>> {
        self.values
            .get(key)
            .map(|values| values.view())
            .ok_or_else(|| ProcessorError::MissingSideChannel(key.to_string()))
    }
}
