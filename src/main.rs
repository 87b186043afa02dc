//! orglens — organizational activity analytics CLI.
//!
//! Reads an activity batch (`{"people": [...], "activities": [...]}`) from a
//! JSON file and prints analysis reports as JSON, or mermaid diagrams with
//! `--mermaid`. Logs go to stderr so stdout stays pipeable.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orglens::config::AnalysisSettings;
use orglens::department::{collaboration_matrix, DepartmentAnalyzer};
use orglens::models::ActivityBatch;
use orglens::workflow::WorkflowAnalyzer;

#[derive(Parser)]
#[command(name = "orglens")]
#[command(about = "Organizational activity graph analytics")]
struct Cli {
    /// Path to a YAML settings file (defaults apply when absent)
    #[arg(long, env = "ORGLENS_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze department interactions
    Departments {
        /// Activity batch JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Render the interaction network as a mermaid diagram instead of JSON
        #[arg(long)]
        mermaid: bool,

        /// Include the collaboration matrix in the JSON output
        #[arg(long)]
        matrix: bool,
    },

    /// Mine workflows and analyze their bottlenecks
    Workflows {
        /// Activity batch JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Render each mined workflow as a mermaid diagram instead of JSON
        #[arg(long)]
        mermaid: bool,
    },
}

fn load_batch(path: &Path) -> Result<ActivityBatch> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read activity batch {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse activity batch {}", path.display()))
}

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, so stdout stays clean for reports)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = AnalysisSettings::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Departments {
            input,
            mermaid,
            matrix,
        } => {
            let batch = load_batch(&input)?;
            let analysis = DepartmentAnalyzer::new(settings.department).analyze(&batch)?;

            if mermaid {
                println!("{}", orglens::mermaid::department_network(&analysis.graph));
            } else if matrix {
                let collab = collaboration_matrix(&analysis.graph);
                let output = serde_json::json!({
                    "report": analysis.report,
                    "collaboration_matrix": collab,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&analysis.report)?);
            }
        }

        Commands::Workflows { input, mermaid } => {
            let batch = load_batch(&input)?;
            let report = WorkflowAnalyzer::new(settings.workflow).analyze(&batch)?;

            if mermaid {
                for workflow in &report.workflows {
                    println!("{}\n", orglens::mermaid::workflow_flow(workflow));
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }

    Ok(())
}
