use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod ai;
mod calendar;
mod config;
mod documents;
mod docx;
mod generator;
mod html;
mod ooxml;
mod package;
mod pptx;
mod prompt;
mod server;
mod templates;
mod types;

use ai::ContentSource;
use calendar::MonthCalendar;
use config::Settings;
use generator::LessonPlanGenerator;
use types::{GenerateResponse, LessonRequest};

#[derive(Parser, Debug)]
#[command(name = "planner")]
#[command(about = "Generate lesson plans, worksheets, rubrics and slides from a lesson form")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output directory for generated files (overrides PLANNER_OUTPUT_DIR)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Address the web server binds to
    #[arg(long, default_value = "127.0.0.1", global = true)]
    bind: IpAddr,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Generate a package from a JSON lesson request (no server)
    Generate {
        /// Path to the request JSON file
        file: PathBuf,
    },

    /// Print the value of the month for a date
    MonthValue {
        /// Date in YYYY-MM-DD format
        date: String,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level))
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("tower_http=warn".parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .init();
}

fn load_calendar(settings: &Settings) -> Result<MonthCalendar> {
    match &settings.values_file {
        Some(path) => MonthCalendar::from_file(path),
        None => Ok(MonthCalendar::default()),
    }
}

fn build_generator(settings: &Settings) -> Result<LessonPlanGenerator> {
    let source = ContentSource::from_settings(&settings.ai)
        .context("Failed to set up the content source")?;
    LessonPlanGenerator::new(source, settings.output_dir.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(output) = args.output {
        settings.output_dir = output;
    }

    match args.command.unwrap_or(Commands::Serve { port: 8080 }) {
        Commands::Serve { port } => {
            let state = Arc::new(server::AppState {
                generator: build_generator(&settings)?,
                calendar: load_calendar(&settings)?,
            });
            server::serve(SocketAddr::new(args.bind, port), state).await?;
        }
        Commands::Generate { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let request: LessonRequest = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid lesson request in {}", file.display()))?;

            let generator = build_generator(&settings)?;
            let response = generator.generate_complete_package(&request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);

            match response {
                GenerateResponse::Success { files, .. } => {
                    let path = generator.output_dir().join(files.package);
                    info!(path = %path.display(), "Package saved");
                }
                GenerateResponse::Error { message } => anyhow::bail!(message),
            }
        }
        Commands::MonthValue { date } => {
            let calendar = load_calendar(&settings)?;
            println!("{}", calendar.value_for(&date)?);
        }
    }

    Ok(())
}
