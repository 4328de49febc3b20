use std::path::PathBuf;
use std::sync::Arc;

use acolyte_roster::config::{load_settings, Settings};
use acolyte_roster::display::{print_diagnostics, render_schedule, write_schedule_to_file};
use acolyte_roster::schedule::{CentralChoice, ServiceTime};
use acolyte_roster::store::CsvStore;
use acolyte_roster::{web, GenerateOptions, Roster};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "acolyte-roster", about = "Weekly acolyte scheduling and attendance")]
struct Cli {
    /// Settings file (defaults to ./acolyte-roster.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create the data directory and sheets, seeding the default masses
    Init,
    /// Generate a week and print it
    Generate {
        /// First day of the week (YYYY-MM-DD); defaults to next Monday
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Central mass time (HH:MM); picked at random when omitted
        #[arg(long)]
        central: Option<ServiceTime>,
        /// Acolytes per mass for this run
        #[arg(long)]
        per_mass: Option<usize>,
    },
    /// Print the stored schedule
    Schedule {
        /// Also write it to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("acolyte_roster={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn open_roster(settings: &Settings) -> Result<Roster, Box<dyn std::error::Error>> {
    let store = CsvStore::open(&settings.storage.data_dir)?;
    Ok(Roster::new(Arc::new(store), settings.generation.clone()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    init_tracing(&settings.logging.level);

    match cli.command {
        Command::Serve { port } => {
            let roster = open_roster(&settings)?;
            let port = port.unwrap_or(settings.server.port);
            println!(
                "Access the API at http://{}:{}",
                settings.server.bind_address, port
            );
            web::start_server(&settings.server.bind_address, port, roster).await?;
        }
        Command::Init => {
            let store = CsvStore::create(&settings.storage.data_dir)?;
            let roster = Roster::new(Arc::new(store), settings.generation.clone());
            roster.initialize()?;
            println!(
                "Initialized sheets in {}",
                settings.storage.data_dir.display()
            );
        }
        Command::Generate {
            start,
            central,
            per_mass,
        } => {
            let roster = open_roster(&settings)?;
            let options = GenerateOptions {
                start,
                per_mass,
                central: CentralChoice::from_request(false, central),
            };
            let report = roster.generate(&options, &mut rand::thread_rng())?;

            println!(
                "Generated {} assignments for {} to {}",
                report.count, report.start, report.end
            );
            print_diagnostics(&report.diagnostics);

            let records: Vec<_> = roster
                .assignments()?
                .into_iter()
                .filter(|r| r.date >= report.start && r.date <= report.end)
                .collect();
            print!("{}", render_schedule(&records, &roster.participants()?));
        }
        Command::Schedule { output } => {
            let roster = open_roster(&settings)?;
            let records = roster.assignments()?;
            let participants = roster.participants()?;
            print!("{}", render_schedule(&records, &participants));
            if let Some(path) = output {
                write_schedule_to_file(&records, &participants, &path)?;
                println!("Schedule saved to {}", path.display());
            }
        }
    }

    Ok(())
}
