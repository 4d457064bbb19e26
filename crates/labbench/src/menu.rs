//! Interactive pipeline menu, shown when no subcommand is given.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Select};

use labbench_core::{PipelineOutcome, PipelineRunner, TaskRegistry};

/// Loop: pick a pipeline, run it, ask whether to run another.
/// Returns the exit code of the last run (0 when nothing ran).
pub fn run_menu(registry: &TaskRegistry, runner: &PipelineRunner<'_>) -> Result<i32> {
    let pipelines = registry.pipelines();
    if pipelines.is_empty() {
        eprintln!("{}", "No pipelines registered.".dimmed());
        return Ok(0);
    }

    let mut items: Vec<String> = pipelines
        .iter()
        .map(|p| format!("{} ({})", p.name, p.description))
        .collect();
    items.push("Exit".to_string());

    let mut last_code = 0;
    loop {
        eprintln!();
        let selection = Select::new()
            .with_prompt("Select a pipeline")
            .items(&items)
            .default(0)
            .interact_opt()?;

        let pipeline = match selection {
            Some(i) if i < pipelines.len() => &pipelines[i],
            _ => break,
        };

        eprintln!();
        eprintln!("Running {}...", pipeline.name.bright_cyan());
        let outcome = runner.run(pipeline)?;
        print_outcome(&outcome);
        last_code = outcome.exit_code();

        let again = Confirm::new()
            .with_prompt("Run another pipeline?")
            .default(false)
            .interact_opt()?
            .unwrap_or(false);
        if !again {
            break;
        }
    }

    eprintln!();
    eprintln!("Goodbye!");
    Ok(last_code)
}

pub fn print_outcome(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::Success {
            pipeline,
            steps,
            total_duration_secs,
        } => {
            eprintln!();
            eprintln!("=== SUCCESS ===");
            eprintln!("Pipeline: {}", pipeline);
            eprintln!("Steps: {}", steps.len());
            eprintln!("Duration: {:.1}s", total_duration_secs);
        }
        PipelineOutcome::Failed {
            pipeline,
            steps_completed,
            failed_step,
            error,
            total_duration_secs,
        } => {
            eprintln!();
            eprintln!("=== FAILED ===");
            eprintln!("Pipeline: {}", pipeline);
            eprintln!(
                "Failed at {} after {} step(s): {}",
                failed_step,
                steps_completed.len(),
                error
            );
            eprintln!("Duration: {:.1}s", total_duration_secs);
            eprintln!("Check the log output above and try again.");
        }
        PipelineOutcome::Interrupted {
            pipeline,
            steps_completed,
            total_duration_secs,
        } => {
            eprintln!();
            eprintln!("=== INTERRUPTED ===");
            eprintln!(
                "{} stopped after {} step(s)",
                pipeline,
                steps_completed.len()
            );
            eprintln!("Duration: {:.1}s", total_duration_secs);
        }
    }
}
