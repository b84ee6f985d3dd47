//! CLI for the iKontrol ingress adapter.

mod commands;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ikontrol_core::bundle::BundleStrategy;
use ikontrol_core::config::{self, AdapterConfig};
use std::io;
use std::path::{Path, PathBuf};

use commands::{run_bundle, run_ingest, run_projects};

/// Top-level CLI for the iKontrol ingress adapter.
#[derive(Debug, Parser)]
#[command(name = "ikontrol-ingress")]
#[command(about = "Forward iKontrol project data to an ingestion endpoint", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/ikontrol-ingress/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Bundle every project and hand it to the ingress endpoint.
    Run {
        /// How projects are bundled: local-zip, json or upstream-zip.
        #[arg(long, value_name = "STRATEGY")]
        strategy: Option<BundleStrategy>,
        /// Only schemes and tasks changed since this date (YYYY-MM-DD).
        #[arg(long, value_name = "DATE")]
        from_date: Option<NaiveDate>,
        /// Write payloads to this directory instead of uploading them.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// List the ids of all projects.
    Projects,

    /// Build the bundle of a single project and write it to disk.
    Bundle {
        /// iKontrol project id.
        project_id: i64,
        /// How the project is bundled: local-zip, json or upstream-zip.
        #[arg(long, value_name = "STRATEGY")]
        strategy: Option<BundleStrategy>,
        /// Output file (default: ./{project_id}.{zip|json}).
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AdapterConfig> {
    match path {
        Some(path) => config::load_from_path(path),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                strategy,
                from_date,
                output_dir,
            } => {
                if let Some(strategy) = strategy {
                    cfg.bundle.strategy = strategy;
                }
                if let Some(from_date) = from_date {
                    cfg.api.from_date = from_date;
                }
                run_ingest(&cfg, output_dir.as_deref())?;
            }
            CliCommand::Projects => run_projects(&cfg, &mut io::stdout().lock())?,
            CliCommand::Bundle {
                project_id,
                strategy,
                out,
            } => {
                if let Some(strategy) = strategy {
                    cfg.bundle.strategy = strategy;
                }
                run_bundle(&cfg, project_id, out.as_deref())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
