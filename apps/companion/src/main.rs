use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use shared_config::AppConfig;
use shared_storage::FileStore;

#[derive(Parser)]
#[command(name = "spark-life-companion")]
#[command(about = "Spark Life patient companion: hydration and appointments")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Today's hydration and the appointment overview (default)
    Status,
    /// Log a glass of water and wait for it to reach the server
    Drink {
        /// Amount in ml; the configured step when omitted
        #[arg(long)]
        ml: Option<u32>,
    },
    /// Start today's count from zero
    Reset,
    /// List upcoming and past appointments
    Appointments {
        /// Skip the recording availability check
        #[arg(long)]
        no_audio: bool,
    },
    /// Book a clinic visit on this device
    Book {
        #[arg(long)]
        clinic: String,
        #[arg(long, default_value = "")]
        address: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// HH:MM
        #[arg(long, value_parser = parse_clock_time)]
        time: NaiveTime,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },
    /// Cancel an appointment by id
    Cancel { id: String },
    /// Save the PDF summary of a past appointment
    Summary {
        id: String,
        #[arg(long, default_value = "summary.pdf")]
        out: PathBuf,
    },
    /// Print the link to the newest consultation summary
    LatestSummary,
}

fn parse_clock_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("expected HH:MM, got '{}'", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Starting Spark Life companion");

    let config = AppConfig::from_env();
    if !config.is_configured() {
        warn!("Backend is not configured, remote calls will fail and local data is used");
    }

    let store = Arc::new(
        FileStore::open(&config.local_store_path)
            .with_context(|| format!("opening local store {}", config.local_store_path.display()))?,
    );

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => commands::status(&config, store).await,
        Command::Drink { ml } => commands::drink(&config, store, ml).await,
        Command::Reset => commands::reset(&config, store).await,
        Command::Appointments { no_audio } => commands::appointments(&config, store, !no_audio).await,
        Command::Book {
            clinic,
            address,
            date,
            time,
            name,
            phone,
        } => commands::book(
            store,
            appointment_cell::NewLocalAppointment {
                clinic_name: clinic,
                clinic_address: address,
                date,
                time,
                name,
                phone,
            },
        ),
        Command::Cancel { id } => commands::cancel(&config, store, &id).await,
        Command::Summary { id, out } => commands::summary(&config, store, &id, &out).await,
        Command::LatestSummary => commands::latest_summary(&config).await,
    }
}
