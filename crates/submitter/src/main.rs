//! Submitter - terminal client for the lesson plan generator.
//!
//! Fills in the same form the planner page shows, submits it to a running
//! planner and optionally downloads the finished package.

mod api;
mod config;
mod form;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use api::HttpApi;
use config::ClientConfig;
use form::{FormController, FormState, LessonForm};

#[derive(Parser)]
#[command(name = "submitter")]
#[command(about = "Submit lesson plan requests to a running planner")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the value of the month for a date (YYYY-MM-DD format)
    MonthValue { date: NaiveDate },

    /// Submit lesson forms read from JSON files
    Submit {
        /// Form JSON files, submitted one after another
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Download the finished package into this directory
        #[arg(long)]
        download: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    info!("Planner: {}", config.base_url);
    let controller = FormController::new(HttpApi::new(config.base_url)?);

    match cli.command {
        Commands::MonthValue { date } => month_value_command(controller, date).await?,
        Commands::Submit { files, download } => submit_command(controller, files, download).await?,
    }

    Ok(())
}

async fn month_value_command(mut controller: FormController<HttpApi>, date: NaiveDate) -> Result<()> {
    let result = controller.set_date(&date.format("%Y-%m-%d").to_string()).await;
    print_alerts(&controller);
    result?;
    println!("{}", controller.form().value);
    Ok(())
}

async fn submit_command(
    mut controller: FormController<HttpApi>,
    files: Vec<PathBuf>,
    download: Option<PathBuf>,
) -> Result<()> {
    let mut failed = 0;
    for file in &files {
        controller.reset();
        match submit_one(&mut controller, file, download.as_deref()).await {
            Ok(true) => {}
            // Already shown through the form alerts
            Ok(false) => failed += 1,
            Err(e) => {
                error!("{}: {:#}", file.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} lesson forms failed", failed, files.len());
    }
    Ok(())
}

/// Submit one form file; `Ok(false)` when the form itself was rejected
async fn submit_one(
    controller: &mut FormController<HttpApi>,
    file: &Path,
    download: Option<&Path>,
) -> Result<bool> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let form: LessonForm = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid lesson form in {}", file.display()))?;

    let date = form.date.clone();
    let needs_value = form.value.trim().is_empty();
    *controller.form_mut() = form;

    // The page fills the value in when the date is picked
    if needs_value && !date.is_empty() {
        if let Err(e) = controller.set_date(&date).await {
            warn!("Continuing without a value of the month: {}", e);
        }
    }

    let result = controller.submit().await;
    print_alerts(controller);
    debug!(ticks = controller.progress_ticks(), "Submission finished");
    if result.is_err() {
        return Ok(false);
    }

    if let FormState::Success { download_url } = controller.state() {
        println!("{}", download_url);
    }
    if let Some(dir) = download {
        let path = controller.download(dir).await?;
        info!("Package saved to: {:?}", path);
    }

    Ok(true)
}

fn print_alerts<A: api::PlannerApi>(controller: &FormController<A>) {
    for alert in controller.alerts() {
        eprintln!("{}", alert);
    }
}
