use crate::generator::profile::BunchTrainGenerator;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::info;
use serde::Serialize;
use sigchain::math::StatsHelper;
use sigchain::Pipeline;

/// Condensed view of one debug snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub plane: &'static str,
    pub label: String,
    pub input_samples: usize,
    pub output_samples: usize,
    pub output_rms: f64,
    pub history_depth: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub turns: usize,
    pub output_rms_x: Vec<f64>,
    pub output_rms_y: Vec<f64>,
    pub output_class: u8,
    pub extensions: Vec<String>,
    pub required_variables: Vec<String>,
    pub stage_calls: usize,
    pub snapshots: Vec<SnapshotSummary>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Builds one pipeline per transverse plane and drives both with the
    /// generated bunch train for the configured number of turns.
    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let processors = self.config.build_processors()?;
        let mut x_plane = Pipeline::new(processors).context("assembling pipeline")?;
        let mut y_plane = x_plane.clone();

        let mut generator =
            BunchTrainGenerator::new(self.config.generator.clone(), x_plane.required_variables())
                .context("configuring bunch train generator")?;
        let output_class = x_plane
            .validate(generator.parameters().class)
            .context("checking signal classes")?;

        let mut output_rms_x = Vec::with_capacity(self.config.turns);
        let mut output_rms_y = Vec::with_capacity(self.config.turns);
        for turn in 0..self.config.turns {
            let frames = generator.next_turn(turn);
            let x = x_plane
                .run(frames.x, &frames.side)
                .with_context(|| format!("processing x plane, turn {}", turn))?;
            let y = y_plane
                .run(frames.y, &frames.side)
                .with_context(|| format!("processing y plane, turn {}", turn))?;
            output_rms_x.push(StatsHelper::rms(x.signal.view()));
            output_rms_y.push(StatsHelper::rms(y.signal.view()));
        }
        info!(
            "processed {} turns through {} stages per plane",
            self.config.turns,
            x_plane.len()
        );

        let mut snapshots = Vec::new();
        for (plane, pipeline) in [("x", &x_plane), ("y", &y_plane)] {
            snapshots.extend(pipeline.debug_snapshots().map(|(label, snapshot)| {
                SnapshotSummary {
                    plane,
                    label,
                    input_samples: snapshot.input_signal().len(),
                    output_samples: snapshot.output_signal().len(),
                    output_rms: StatsHelper::rms(snapshot.output_signal().view()),
                    history_depth: snapshot.output_parameters().previous_parameters.len(),
                }
            }));
        }

        Ok(WorkflowResult {
            turns: self.config.turns,
            output_rms_x,
            output_rms_y,
            output_class: output_class.level(),
            extensions: x_plane.extensions().iter().map(|e| e.to_string()).collect(),
            required_variables: x_plane.required_variables().iter().cloned().collect(),
            stage_calls: x_plane.metrics().stage_calls + y_plane.metrics().stage_calls,
            snapshots,
        })
    }
}

impl WorkflowResult {
    pub fn final_rms(&self) -> (f64, f64) {
        (
            self.output_rms_x.last().copied().unwrap_or(0.0),
            self.output_rms_y.last().copied().unwrap_or(0.0),
        )
    }
}
