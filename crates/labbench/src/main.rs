mod config;
mod init;
mod menu;
mod sessions;
mod tasks;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use labbench_core::{PipelineRunner, ProjectPaths, TaskRegistry};
use labbench_logging::{init_logging, EventLogger, LogFormat, LoggingConfig};

use config::ProjectConfig;
use sessions::{SessionAction, SessionsAction};

#[derive(Parser, Debug)]
#[command(
    name = "labbench",
    about = "Scaffold and pipeline runner for data analysis projects",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root (default: nearest directory with labbench.toml)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log level or filter directive (overrides labbench.toml)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format (overrides labbench.toml)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    /// Don't write a log file under output/logs
    #[arg(long, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the project layout and a default labbench.toml
    Init {
        /// Overwrite an existing labbench.toml
        #[arg(long)]
        force: bool,
    },

    /// List registered pipelines and tasks
    Pipelines,

    /// Run a registered pipeline
    Run {
        /// Pipeline name
        pipeline: String,

        /// Output the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Work with a single analysis session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Browse analysis sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

const EVENTS_FILE: &str = "events.jsonl";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = match cli.root.clone() {
        Some(root) => root,
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            ProjectPaths::discover(&cwd)
        }
    };

    let config = ProjectConfig::load(&root)?.unwrap_or_default();
    let paths = ProjectPaths::from_layout(&root, &config.paths);

    // Only pipeline runs get a log file; everything else is short-lived
    let program = match &cli.command {
        Some(Commands::Run { pipeline, .. }) => pipeline.clone(),
        None => "menu".to_string(),
        Some(_) => "labbench".to_string(),
    };
    let wants_log_file = matches!(cli.command, None | Some(Commands::Run { .. }));
    let logging = logging_config(&cli, config.logging.clone(), &paths, &program, wants_log_file);
    let _guard = init_logging(&logging).context("Failed to initialize logging")?;

    tracing::debug!(root = %paths.root.display(), "Resolved project root");

    let code = match cli.command {
        Some(Commands::Init { force }) => {
            init::handle_init(&paths, force)?;
            0
        }
        Some(Commands::Pipelines) => {
            let registry = tasks::build_registry()?;
            print_pipelines(&registry);
            0
        }
        Some(Commands::Session { action }) => {
            sessions::handle_session_command(action, &paths, &config.session)?;
            0
        }
        Some(Commands::Sessions { action }) => {
            sessions::handle_sessions_command(action, &paths, &config.session)?;
            0
        }
        Some(Commands::Run { pipeline, json }) => {
            let registry = tasks::build_registry()?;
            let runner = build_runner(&registry, &paths, &config, &logging)?;

            let outcome = runner
                .run_named(&pipeline)
                .with_context(|| format!("Cannot run pipeline '{}'", pipeline))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                menu::print_outcome(&outcome);
            }
            outcome.exit_code()
        }
        None => {
            let registry = tasks::build_registry()?;
            let runner = build_runner(&registry, &paths, &config, &logging)?;
            menu::run_menu(&registry, &runner)?
        }
    };

    // Flush the log file before exiting
    drop(_guard);
    std::process::exit(code);
}

fn logging_config(
    cli: &Cli,
    mut logging: LoggingConfig,
    paths: &ProjectPaths,
    program: &str,
    wants_log_file: bool,
) -> LoggingConfig {
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        logging.format = format.into();
    }
    logging.log_to_file = logging.log_to_file && wants_log_file && !cli.no_log_file;
    logging
        .with_log_dir(&paths.logs)
        .with_program(program)
}

fn build_runner<'a>(
    registry: &'a TaskRegistry,
    paths: &ProjectPaths,
    config: &ProjectConfig,
    logging: &LoggingConfig,
) -> Result<PipelineRunner<'a>> {
    let events = if logging.log_to_file {
        let events_path = paths.logs.join(EVENTS_FILE);
        EventLogger::with_file(logging.format, &events_path)
            .with_context(|| format!("Failed to open {}", events_path.display()))?
    } else {
        EventLogger::new(logging.format)
    };

    let runner = PipelineRunner::new(
        registry,
        paths.clone(),
        config.session.clone(),
        Arc::new(events),
    );

    // Handle Ctrl+C gracefully
    let interrupt_handle = runner.interrupt_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Finishing current step...");
        interrupt_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    Ok(runner)
}

fn print_pipelines(registry: &TaskRegistry) {
    println!("{}", "Pipelines:".bold());
    for pipeline in registry.pipelines() {
        println!(
            "  {} {}",
            pipeline.name.bright_cyan(),
            pipeline.description.dimmed()
        );
        for (i, step) in pipeline.steps.iter().enumerate() {
            println!("    {}. {} ({})", i + 1, step.title, step.task);
        }
    }

    println!();
    println!("{}", "Tasks:".bold());
    for task in registry.tasks() {
        println!("  {:<20} {}", task.id(), task.description().dimmed());
    }
}
