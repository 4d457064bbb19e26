//! Built-in tasks and pipelines.
//!
//! Projects add their own by registering them here, next to the example.

pub mod example;

use labbench_core::{Pipeline, RegistryError, TaskRegistry};

/// Register every task and pipeline this binary knows about.
pub fn build_registry() -> Result<TaskRegistry, RegistryError> {
    let mut registry = TaskRegistry::new();

    registry.register_fn(
        "example_collect",
        "Write the sample producer-price extract to data/raw/pc",
        example::collect,
    )?;
    registry.register_fn(
        "example_process",
        "Filter to monthly three-digit NAICS series since 2015",
        example::process,
    )?;
    registry.register_fn(
        "example_analysis",
        "Rank sectors by PPI increase into an analysis session",
        example::analyze,
    )?;

    registry.register_pipeline(
        Pipeline::new("example", "Example pipeline (demonstrates template structure)")
            .step("Data Collection", "example_collect")
            .step("Data Processing", "example_process")
            .step("Analysis", "example_analysis"),
    )?;

    Ok(registry)
}
