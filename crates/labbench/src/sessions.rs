use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use labbench_core::ProjectPaths;
use labbench_session::{AnalysisSession, SessionConfig, SessionEntry, SessionFilter, SessionStore};

#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// Create a new timestamped session directory and print its path
    New {
        /// Analysis name (a single path segment)
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionsAction {
    /// List all sessions under the output directory
    List {
        /// Only sessions of this analysis
        #[arg(long)]
        name: Option<String>,

        /// Show sessions created on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the directory of the most recent session of an analysis
    Latest {
        /// Analysis name
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn handle_session_command(
    action: SessionAction,
    paths: &ProjectPaths,
    config: &SessionConfig,
) -> Result<()> {
    match action {
        SessionAction::New { name } => {
            let session = AnalysisSession::create(&name, &paths.output, config)
                .with_context(|| format!("Failed to create session '{}'", name))?;
            // Plain stdout so scripts can capture it
            println!("{}", session.dir().display());
        }
    }
    Ok(())
}

pub fn handle_sessions_command(
    action: SessionsAction,
    paths: &ProjectPaths,
    config: &SessionConfig,
) -> Result<()> {
    let store = SessionStore::new(&paths.output, config);

    match action {
        SessionsAction::List { name, since, json } => {
            let filter = build_filter(name, since)?;
            let entries = store.list(&filter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("{}", "No sessions found.".dimmed());
            } else {
                print_sessions_table(&entries);
            }
        }
        SessionsAction::Latest { name, json } => match store.latest(&name)? {
            Some(entry) if json => println!("{}", serde_json::to_string_pretty(&entry)?),
            Some(entry) => println!("{}", entry.dir.display()),
            None => anyhow::bail!("No sessions found for '{}'", name),
        },
    }

    Ok(())
}

fn build_filter(name: Option<String>, since: Option<String>) -> Result<SessionFilter> {
    use chrono::NaiveDate;

    let since = since
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("Invalid --since date: {}", e))
        })
        .transpose()?;

    Ok(SessionFilter { name, since })
}

fn print_sessions_table(entries: &[SessionEntry]) {
    println!(
        "{:<28} {:<22} {:<6} {}",
        "ANALYSIS".dimmed(),
        "CREATED".dimmed(),
        "FILES".dimmed(),
        "DIRECTORY".dimmed(),
    );

    for e in entries {
        let created = match e.created_at {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => e.timestamp.clone(),
        };
        let files = if e.file_count == 0 {
            "0".dimmed().to_string()
        } else {
            e.file_count.to_string()
        };
        let name = if e.name.chars().count() > 27 {
            format!("{}...", e.name.chars().take(24).collect::<String>())
        } else {
            e.name.clone()
        };

        println!(
            "{:<28} {:<22} {:<6} {}",
            name.bright_cyan(),
            created,
            files,
            e.dir.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        let filter = build_filter(Some("ppi".into()), Some("2025-08-01".into())).unwrap();
        assert_eq!(filter.name.as_deref(), Some("ppi"));
        assert_eq!(
            filter.since,
            chrono::NaiveDate::from_ymd_opt(2025, 8, 1)
        );
        assert!(build_filter(None, Some("08/01/2025".into())).is_err());
    }
}
