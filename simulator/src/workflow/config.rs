use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use sigchain::processing::{
    Bypass, ChargeNormalization, ChargeWeighter, Gain, TurnFirFilter, Upsampler,
};
use sigchain::{ConfigResult, Processor, ProcessorOptions};
use std::fs;
use std::path::Path;

/// One pipeline stage as written in a workflow file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageSpec {
    Bypass {
        #[serde(flatten)]
        options: ProcessorOptions,
    },
    Gain {
        factor: f64,
        #[serde(flatten)]
        options: ProcessorOptions,
    },
    ChargeWeighter {
        #[serde(default)]
        normalization: ChargeNormalization,
        #[serde(flatten)]
        options: ProcessorOptions,
    },
    Upsampler {
        factor: usize,
        #[serde(flatten)]
        options: ProcessorOptions,
    },
    TurnFir {
        coefficients: Vec<f64>,
        #[serde(flatten)]
        options: ProcessorOptions,
    },
}

impl StageSpec {
    pub fn options_mut(&mut self) -> &mut ProcessorOptions {
        match self {
            StageSpec::Bypass { options }
            | StageSpec::Gain { options, .. }
            | StageSpec::ChargeWeighter { options, .. }
            | StageSpec::Upsampler { options, .. }
            | StageSpec::TurnFir { options, .. } => options,
        }
    }

    pub fn build(&self) -> ConfigResult<Box<dyn Processor>> {
        Ok(match self {
            StageSpec::Bypass { options } => options.build(Bypass::with_options(options)),
            StageSpec::Gain { factor, options } => {
                options.build(Gain::with_options(*factor, options))
            }
            StageSpec::ChargeWeighter {
                normalization,
                options,
            } => options.build(ChargeWeighter::with_options(*normalization, options)),
            StageSpec::Upsampler { factor, options } => {
                options.build(Upsampler::with_options(*factor, options)?)
            }
            StageSpec::TurnFir {
                coefficients,
                options,
            } => options.build(TurnFirFilter::with_options(coefficients.clone(), options)?),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_turns")]
    pub turns: usize,
    #[serde(default)]
    pub generator: GeneratorConfig,
    pub stages: Vec<StageSpec>,
}

fn default_turns() -> usize {
    16
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            turns: default_turns(),
            generator: GeneratorConfig::default(),
            stages: vec![
                StageSpec::Bypass {
                    options: ProcessorOptions::default(),
                },
                StageSpec::ChargeWeighter {
                    normalization: ChargeNormalization::SegmentAverage,
                    options: ProcessorOptions::default(),
                },
                StageSpec::TurnFir {
                    coefficients: vec![0.5, -0.25, -0.25],
                    options: ProcessorOptions::labelled("turn filter"),
                },
                StageSpec::Upsampler {
                    factor: 3,
                    options: ProcessorOptions::default(),
                },
                StageSpec::Gain {
                    factor: 0.1,
                    options: ProcessorOptions::labelled("kicker"),
                },
            ],
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Turns on snapshot capture for every stage.
    pub fn enable_debug(&mut self) {
        for stage in &mut self.stages {
            stage.options_mut().debug = true;
        }
    }

    pub fn build_processors(&self) -> anyhow::Result<Vec<Box<dyn Processor>>> {
        self.stages
            .iter()
            .enumerate()
            .map(|(index, stage)| {
                stage
                    .build()
                    .with_context(|| format!("building stage {} ({:?})", index, stage))
            })
            .collect()
    }
}
