use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic bunch-train driver for the sigchain pipeline")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Override the number of turns from the workflow
    #[arg(long)]
    turns: Option<usize>,
    /// Capture input/output snapshots on every stage
    #[arg(long, default_value_t = false)]
    debug: bool,
    /// Write the run summary as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    if let Some(turns) = args.turns {
        workflow_config.turns = turns;
    }
    if args.debug {
        workflow_config.enable_debug();
    }

    let result = Runner::new(workflow_config).execute()?;
    let (rms_x, rms_y) = result.final_rms();

    println!(
        "Ran {} turns -> final rms x {:.3e}, y {:.3e}, output class {}, extensions [{}], bunch variables [{}]",
        result.turns,
        rms_x,
        rms_y,
        result.output_class,
        result.extensions.join(", "),
        result.required_variables.join(", ")
    );
    for snapshot in &result.snapshots {
        println!(
            "  {} plane {:<16} {:>5} -> {:>5} samples, rms {:.3e}",
            snapshot.plane,
            snapshot.label,
            snapshot.input_samples,
            snapshot.output_samples,
            snapshot.output_rms
        );
    }

    if let Some(report_path) = args.report {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let report = serde_json::to_string_pretty(&result).context("serializing run report")?;
        fs::write(&report_path, report)
            .with_context(|| format!("writing report {}", report_path.display()))?;
    }

    Ok(())
}
