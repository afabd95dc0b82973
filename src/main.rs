use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ferrywatch::checker::RunOutcome;
use ferrywatch::config::{Config, LoggingConfig};
use ferrywatch::history::RunLog;

#[derive(Parser)]
#[command(
    name = "ferrywatch",
    about = "Periodic ferry route status checker",
    version,
    long_about = None
)]
struct Cli {
    /// Config file (TOML). Falls back to $FERRYWATCH_CONFIG, then /etc/ferrywatch/ferrywatch.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Route registry file (YAML), overrides the config
    #[arg(long, global = true)]
    routes: Option<PathBuf>,

    /// Run history file (JSON), overrides the config
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every route once and prepend the run to the history
    Check {
        /// Print the run record (or error object) as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check on the configured cron schedule until interrupted
    Watch {
        /// Cron expression (6-field, seconds first), overrides the config
        #[arg(long)]
        cron: Option<String>,
    },

    /// List the routes loaded from the registry
    Routes,

    /// Show the most recent recorded runs
    History {
        /// Number of runs to show
        #[arg(long, default_value = "1")]
        limit: usize,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Preview the next scheduled run times
    NextRuns {
        /// Number of run times to show
        #[arg(long, default_value = "5")]
        count: usize,
    },
}

fn init_tracing(logging: &LoggingConfig, force_json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json || force_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(cli.config.as_deref());
    if let Some(routes) = cli.routes {
        config.paths.routes_file = routes;
    }
    if let Some(history) = cli.history {
        config.paths.history_file = history;
    }

    init_tracing(&config.logging, cli.log_json);

    match cli.command {
        Commands::Check { json } => {
            let outcome = ferrywatch::run_once(&config).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match &outcome {
                    RunOutcome::Completed(record) => {
                        println!("Execution time: {:.2} seconds", record.execution_time_seconds);
                        println!("\n[RESULT] Route Status Results:");
                        for line in record.summary_lines() {
                            println!("{}", line);
                        }
                    }
                    RunOutcome::Failed(failure) => {
                        eprintln!("[ERROR] {}", failure.message);
                    }
                }
            }
            if outcome.is_failed() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Watch { cron } => {
            if let Some(cron) = cron {
                config.schedule.cron = cron;
            }
            tracing::info!(cron = %config.schedule.cron, "Starting watch mode");
            ferrywatch::scheduler::watch(config).await?;
        }
        Commands::Routes => {
            let routes = ferrywatch::registry::load(&config.paths.routes_file)?;
            if routes.is_empty() {
                println!("No routes found.");
            } else {
                println!("{:<5} | {:<35} | Status URL", "ID", "Name");
                println!("{:-<5}-|-{:-<35}-|-{:-<40}", "", "", "");
                for route in routes {
                    println!("{:<5} | {:<35} | {}", route.display_id(), route.name, route.status_url);
                }
            }
        }
        Commands::History { limit, json } => {
            let log = RunLog::new(&config.paths.history_file, config.history.max_runs);
            let history = log.load();
            let recent = &history[..limit.min(history.len())];
            if json {
                println!("{}", serde_json::to_string_pretty(recent)?);
            } else if recent.is_empty() {
                println!("No runs recorded in {}.", log.path().display());
            } else {
                for record in recent {
                    println!(
                        "\n=== {} ({} routes, {:.2}s) ===",
                        record.timestamp,
                        record.routes.len(),
                        record.execution_time_seconds
                    );
                    for line in record.summary_lines() {
                        println!("{}", line);
                    }
                }
            }
        }
        Commands::NextRuns { count } => {
            let runs = ferrywatch::scheduler::next_runs(&config.schedule.cron, count)?;
            println!("Upcoming runs ({}):", config.schedule.cron);
            for time in runs {
                println!("{}", time.to_rfc3339());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
