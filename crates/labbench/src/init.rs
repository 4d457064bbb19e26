//! Project scaffolding for labbench.
//!
//! Creates the directory layout and a default `labbench.toml`.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use labbench_core::{ProjectPaths, PROJECT_MARKER};

use crate::config::DEFAULT_CONFIG;

const METADATA_GUIDE: &str = "# Metadata

Document every dataset that lands in `data/raw/` here, one file per source:

- where it came from (URL, API endpoint, request parameters)
- when it was retrieved
- units, frequency and any known revisions
- column definitions for anything not self-explanatory

Processed tables in `data/processed/` should name the raw inputs they were
built from.
";

pub fn handle_init(paths: &ProjectPaths, force: bool) -> Result<()> {
    eprintln!(
        "{} {}",
        "Setting up labbench project in".bold(),
        paths.root.display()
    );
    eprintln!();

    paths
        .ensure_layout()
        .context("Failed to create project directories")?;
    for dir in paths.layout_dirs() {
        eprintln!(
            "  {} {}",
            "✓".bright_green(),
            display_relative(dir, &paths.root)
        );
    }

    let guide = paths.metadata.join("README.md");
    if !guide.exists() {
        fs::write(&guide, METADATA_GUIDE)
            .with_context(|| format!("Failed to write {}", guide.display()))?;
        eprintln!(
            "  {} {}",
            "✓".bright_green(),
            display_relative(&guide, &paths.root)
        );
    }

    let config_path = paths.root.join(PROJECT_MARKER);
    if config_path.exists() && !force {
        eprintln!();
        eprintln!(
            "{} Config already exists at {} (use {} to replace it)",
            "⚠".bright_yellow(),
            config_path.display(),
            "--force".bright_cyan()
        );
    } else {
        fs::write(&config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        eprintln!();
        eprintln!(
            "{} Config saved to {}",
            "✓".bright_green(),
            config_path.display()
        );
    }

    print_getting_started();
    Ok(())
}

/// Print the getting started guide
pub fn print_getting_started() {
    eprintln!();
    eprintln!("{}", "Getting started:".bold());
    eprintln!(
        "  {} Put source extracts in {}",
        "1.".dimmed(),
        "data/raw/".bright_cyan()
    );
    eprintln!(
        "  {} Register your tasks and pipelines in {}",
        "2.".dimmed(),
        "src/tasks/".bright_cyan()
    );
    eprintln!(
        "  {} Run: {}",
        "3.".dimmed(),
        "labbench run example".bright_cyan()
    );
    eprintln!(
        "  {} Browse results: {}",
        "4.".dimmed(),
        "labbench sessions list".bright_cyan()
    );
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
