use anyhow::{bail, Context};
use ndarray::{s, Array1};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sigchain::signal::bins::bin_edges_to_z_bins;
use sigchain::signal::N_MACROPARTICLES_PER_SLICE;
use sigchain::{Frame, Parameters, SideChannel, SliceSet};
use std::collections::BTreeSet;
use std::f64::consts::PI;

pub const MEAN_X: &str = "mean_x";
pub const MEAN_Y: &str = "mean_y";

const SUPPORTED_STATISTICS: [&str; 3] = [N_MACROPARTICLES_PER_SLICE, MEAN_X, MEAN_Y];

/// Configuration for generating a synthetic bunch train.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub bunches: usize,
    pub slices_per_bunch: usize,
    /// Slice width in seconds.
    pub slice_width: f64,
    /// Distance between bunch centres in seconds.
    pub bunch_spacing: f64,
    pub macroparticles: f64,
    /// Peak transverse displacement in metres.
    pub amplitude: f64,
    pub tune_x: f64,
    pub tune_y: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bunches: 4,
            slices_per_bunch: 20,
            slice_width: 2.5e-11,
            bunch_spacing: 25e-9,
            macroparticles: 1e5,
            amplitude: 1e-4,
            tune_x: 0.31,
            tune_y: 0.32,
            noise: 1e-6,
            seed: 0,
        }
    }
}

/// Pickup signals of both transverse planes for one turn.
pub struct Turn {
    pub x: Frame,
    pub y: Frame,
    pub side: SideChannel,
}

/// Rigid bunches oscillating at the configured tunes, sliced into a
/// Gaussian charge profile.
pub struct BunchTrainGenerator {
    config: GeneratorConfig,
    parameters: Parameters,
    charge: Array1<f64>,
    statistics: BTreeSet<String>,
    rng: StdRng,
}

impl BunchTrainGenerator {
    /// `statistics` lists the bunch statistics the pipeline consumes; only
    /// those are computed.
    pub fn new(config: GeneratorConfig, statistics: &BTreeSet<String>) -> anyhow::Result<Self> {
        if let Some(unknown) = statistics
            .iter()
            .find(|name| !SUPPORTED_STATISTICS.contains(&name.as_str()))
        {
            bail!("generator cannot provide bunch statistic '{}'", unknown);
        }

        let parameters = Parameters::uniform(
            config.bunches,
            config.slices_per_bunch,
            config.slice_width,
            config.bunch_spacing,
        )
        .context("building bunch train layout")?;
        let charge = charge_profile(config.slices_per_bunch, config.macroparticles);
        let rng = StdRng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            parameters,
            charge,
            statistics: statistics.clone(),
            rng,
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn next_turn(&mut self, turn: usize) -> Turn {
        let x = self.displacement(self.config.tune_x, turn);
        let y = self.displacement(self.config.tune_y, turn);

        let n_slices = self.config.slices_per_bunch;
        let slice_sets = (0..self.config.bunches)
            .map(|bunch| {
                let (from, to) = (bunch * n_slices, (bunch + 1) * n_slices);
                let edges = self.parameters.bin_edges.slice(s![from..to, ..]).to_owned();
                let mut slice_set = SliceSet::new(bin_edges_to_z_bins(&edges));
                for name in &self.statistics {
                    let values = match name.as_str() {
                        N_MACROPARTICLES_PER_SLICE => self.charge.clone(),
                        MEAN_X => x.slice(s![from..to]).to_owned(),
                        _ => y.slice(s![from..to]).to_owned(),
                    };
                    slice_set.insert_statistic(name.clone(), values);
                }
                slice_set
            })
            .collect();

        Turn {
            x: Frame::new(self.parameters.clone(), x),
            y: Frame::new(self.parameters.clone(), y),
            side: SideChannel::new().with_slice_sets(slice_sets),
        }
    }

    fn displacement(&mut self, tune: f64, turn: usize) -> Array1<f64> {
        let n_slices = self.config.slices_per_bunch;
        let mut samples = Vec::with_capacity(self.config.bunches * n_slices);
        for bunch in 0..self.config.bunches {
            let phase = 2.0 * PI * tune * turn as f64 + 0.1 * bunch as f64;
            let centroid = self.config.amplitude * phase.cos();
            for _ in 0..n_slices {
                let jitter = if self.config.noise > 0.0 {
                    self.rng.gen_range(-self.config.noise..self.config.noise)
                } else {
                    0.0
                };
                samples.push(centroid + jitter);
            }
        }
        Array1::from(samples)
    }
}

/// Gaussian profile over +-3 sigma, scaled to `total` macroparticles.
fn charge_profile(n_slices: usize, total: f64) -> Array1<f64> {
    let weights = Array1::from_shape_fn(n_slices, |j| {
        let x = -3.0 + 6.0 * (j as f64 + 0.5) / n_slices as f64;
        (-0.5 * x * x).exp()
    });
    let sum = weights.sum();
    weights * (total / sum)
}
