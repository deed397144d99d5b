//! Pure helpers over bin edge tables.
//!
//! Edges are stored as an `(n, 2)` array where row `i` holds the start and
//! end of bin `i`. The flat `z_bins` form lists the `n + 1` boundaries of a
//! contiguous bin set.

use ndarray::{Array1, Array2};

/// `end - start` for every bin.
pub fn bin_widths(bin_edges: &Array2<f64>) -> Array1<f64> {
    &bin_edges.column(1) - &bin_edges.column(0)
}

/// `(start + end) / 2` for every bin.
pub fn bin_mids(bin_edges: &Array2<f64>) -> Array1<f64> {
    (&bin_edges.column(0) + &bin_edges.column(1)) / 2.0
}

/// Start of every bin followed by the end of the last one.
pub fn bin_edges_to_z_bins(bin_edges: &Array2<f64>) -> Array1<f64> {
    let n_bins = bin_edges.nrows();
    if n_bins == 0 {
        return Array1::zeros(0);
    }

    let mut z_bins = Vec::with_capacity(n_bins + 1);
    z_bins.extend(bin_edges.column(0).iter().copied());
    z_bins.push(bin_edges[[n_bins - 1, 1]]);
    Array1::from(z_bins)
}

/// Consecutive boundary pairs; fewer than two boundaries yield no bins.
pub fn z_bins_to_bin_edges(z_bins: &Array1<f64>) -> Array2<f64> {
    if z_bins.len() < 2 {
        return Array2::zeros((0, 2));
    }
    Array2::from_shape_fn((z_bins.len() - 1, 2), |(i, j)| z_bins[i + j])
}

/// Rows of `first` followed by rows of `second`.
pub fn append_bin_edges(first: &Array2<f64>, second: &Array2<f64>) -> Array2<f64> {
    let split = first.nrows();
    Array2::from_shape_fn((split + second.nrows(), 2), |(i, j)| {
        if i < split {
            first[[i, j]]
        } else {
            second[[i - split, j]]
        }
    })
}
