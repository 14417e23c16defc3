//! Inspectra CLI - housing-inspection risk dashboard

#![deny(warnings)]

// Global invariants enforced:
// - Each invocation loads the warehouse and rebuilds the full view
// - Rendered output goes to stdout, diagnostics to stderr

use anyhow::Context;
use clap::{Parser, Subcommand};
use inspectra_core::config::{self, ResolvedConfig};
use inspectra_core::model::LoadWarning;
use inspectra_core::view::{self, InspectionFocus, ViewOptions};
use inspectra_core::{html, load_view, render, report, warehouse};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inspectra")]
#[command(about = "AI-assisted home and building inspection dashboard")]
#[command(version = env!("INSPECTRA_VERSION"))]
struct Cli {
    /// Path to the SQLite warehouse (overrides config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to config file (default: auto-discover)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the properties available for inspection
    Properties,
    /// Show the dashboard for one property
    View {
        /// Property to inspect
        property_id: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Highlight only high-risk rooms
        #[arg(long)]
        only_high_risk: bool,

        /// Inspection focus: overall, structural, electrical or finishing
        #[arg(long, default_value = "overall")]
        focus: InspectionFocus,

        /// Write output to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate the downloadable inspection report
    Report {
        /// Property to report on
        property_id: String,

        /// Directory the report file is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print the report instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without loading data
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Properties => {
            let (resolved, database) = resolve(cli.db.as_deref(), cli.config.as_deref())?;
            let dataset = warehouse::load_dataset(&database, &resolved.tables)?;
            report_load_warnings(&dataset.warnings);
            if dataset.properties.is_empty() {
                anyhow::bail!("{}", view::ViewError::NoInspectionData);
            }
            let listed: Vec<_> = view::property_ids(&dataset)
                .into_iter()
                .filter_map(|id| dataset.property(id))
                .collect();
            print!("{}", render::render_property_list(&listed));
        }
        Commands::View {
            property_id,
            format,
            only_high_risk,
            focus,
            output,
        } => {
            let (resolved, database) = resolve(cli.db.as_deref(), cli.config.as_deref())?;
            let options = ViewOptions {
                focus,
                only_high_risk,
            };
            let dashboard = load_view(&resolved, &database, &property_id, options)?;

            let rendered = match format {
                OutputFormat::Text => render::render_text(&dashboard),
                OutputFormat::Json => format!("{}\n", render::render_json(&dashboard)),
                OutputFormat::Html => html::render_html_view(&dashboard),
            };

            match output {
                Some(path) => {
                    report::atomic_write(&path, &rendered)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => {
                    // Text output already carries load warnings inline
                    if !matches!(format, OutputFormat::Text) {
                        report_load_warnings(&dashboard.warnings);
                    }
                    print!("{}", rendered);
                }
            }
        }
        Commands::Report {
            property_id,
            out_dir,
            stdout,
        } => {
            let (resolved, database) = resolve(cli.db.as_deref(), cli.config.as_deref())?;
            let dashboard =
                load_view(&resolved, &database, &property_id, ViewOptions::default())?;
            report_load_warnings(&dashboard.warnings);

            if stdout {
                print!("{}", report::render_view_report(&dashboard));
            } else {
                let path = report::write_report(&out_dir, &dashboard)?;
                println!("{}", path.display());
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let cwd = std::env::current_dir()?;
                match config::load_and_resolve(&cwd, path.as_deref()) {
                    Ok(resolved) => {
                        if let Some(ref p) = resolved.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let cwd = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&cwd, path.as_deref())
                    .context("failed to load configuration")?;
                print!("{}", describe_config(&resolved));
            }
        },
    }

    Ok(())
}

/// Structured logs on stderr, filtered by `INSPECTRA_LOG` (default: warn)
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("INSPECTRA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration and the warehouse path
fn resolve(
    db: Option<&Path>,
    config_path: Option<&Path>,
) -> anyhow::Result<(ResolvedConfig, PathBuf)> {
    let cwd = std::env::current_dir()?;
    let resolved =
        config::load_and_resolve(&cwd, config_path).context("failed to load configuration")?;

    if let Some(path) = &resolved.config_path {
        tracing::info!(path = %path.display(), "using config");
    }

    // CLI flag overrides config file value
    let database = db
        .map(Path::to_path_buf)
        .or_else(|| resolved.database.clone())
        .context("no warehouse given: pass --db or set \"database\" in the config file")?;

    if !database.exists() {
        anyhow::bail!("Warehouse does not exist: {}", database.display());
    }

    Ok((resolved, database))
}

fn report_load_warnings(warnings: &[LoadWarning]) {
    for warning in warnings {
        eprintln!("{}", warning);
    }
}

fn describe_config(resolved: &ResolvedConfig) -> String {
    let mut out = String::new();
    out.push_str("Configuration:\n");
    match resolved.config_path {
        Some(ref p) => out.push_str(&format!("  Source: {}\n", p.display())),
        None => out.push_str("  Source: defaults (no config file found)\n"),
    }
    out.push_str(&format!(
        "  Database: {}\n",
        resolved
            .database
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    out.push('\n');
    out.push_str("Tables:\n");
    out.push_str(&format!("  property: {}\n", resolved.tables.property));
    out.push_str(&format!("  room: {}\n", resolved.tables.room));
    out.push_str(&format!("  summary: {}\n", resolved.tables.summary));
    out.push_str(&format!("  image: {}\n", resolved.tables.image));
    out.push_str(&format!("  bank: {}\n", resolved.tables.bank));
    out.push('\n');
    out.push_str("Thresholds:\n");
    out.push_str(&format!("  high: {}\n", resolved.thresholds.high));
    out.push_str(&format!("  medium: {}\n", resolved.thresholds.medium));
    out.push_str(&format!("  low: {}\n", resolved.thresholds.low));
    out.push('\n');
    out.push_str("Coverage:\n");
    out.push_str(&format!(
        "  full_inspection_rooms: {}\n",
        resolved.coverage.full_inspection_rooms
    ));
    out.push_str(&format!(
        "  confidence_min_rooms: {}\n",
        resolved.coverage.confidence_min_rooms
    ));
    out.push_str(&format!(
        "  high_risk_cutoff: {}\n",
        resolved.high_risk_cutoff
    ));
    out
}
