use ndarray::{Array1, ArrayView1};
use std::collections::BTreeMap;

/// Slice boundaries; always available from a slice set and never requested.
pub const Z_BINS: &str = "z_bins";
pub const N_MACROPARTICLES_PER_SLICE: &str = "n_macroparticles_per_slice";

/// Statistics of one bunch, one value per slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceSet {
    pub z_bins: Array1<f64>,
    statistics: BTreeMap<String, Array1<f64>>,
}

impl SliceSet {
    pub fn new(z_bins: Array1<f64>) -> Self {
        Self {
            z_bins,
            statistics: BTreeMap::new(),
        }
    }

    pub fn with_statistic(mut self, name: impl Into<String>, values: Array1<f64>) -> Self {
        self.insert_statistic(name, values);
        self
    }

    pub fn insert_statistic(&mut self, name: impl Into<String>, values: Array1<f64>) {
        self.statistics.insert(name.into(), values);
    }

    pub fn n_slices(&self) -> usize {
        self.z_bins.len().saturating_sub(1)
    }

    /// Named statistic; [`Z_BINS`] resolves to the slice boundaries.
    pub fn statistic(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        if name == Z_BINS {
            return Some(self.z_bins.view());
        }
        self.statistics.get(name).map(|values| values.view())
    }

    pub fn statistic_names(&self) -> impl Iterator<Item = &str> {
        self.statistics.keys().map(String::as_str)
    }
}
