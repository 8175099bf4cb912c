use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};

use velo_scout::holidays::HolidayExpander;
use velo_scout::pipeline::{run, run_pipeline, RunSummary};
use velo_scout::scraping;
use velo_scout::Store;

#[derive(Parser)]
#[command(name = "velo-scout")]
#[command(about = "Scrapes European cycling events and holiday getaways into the event store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full scrape-and-sync pass over every source
    Run,
    /// List the available source scrapers
    Sources,
    /// Scrape a single source and persist its events
    Scrape {
        /// Source id as printed by `sources`
        id: String,
    },
    /// Expand public holidays into weekend getaways and persist them
    Holidays {
        /// Calendar year to expand (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run => {
            let summary = run()?;
            print_summary(&summary);
        }
        Commands::Sources => {
            for source in scraping::list_sources() {
                println!("{:<16} {}", source.id, source.url);
            }
        }
        Commands::Scrape { id } => {
            let store = Store::open_default()?;
            let today = Local::now().date_naive();
            let scraper = scraping::find_scraper(&id)
                .ok_or_else(|| anyhow::anyhow!("unknown source id: {id}"))?;
            let summary = run_pipeline(&store, std::slice::from_ref(&scraper), today)?;
            print_summary(&summary);
        }
        Commands::Holidays { year } => {
            let store = Store::open_default()?;
            let today = Local::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let mut events = HolidayExpander::new().expand(year);
            events.retain(|event| event.start_date >= today);
            let (inserted, skipped) = store.filter_and_persist(&events)?;
            println!("{inserted} inserted, {skipped} skipped");
        }
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{} inserted, {} skipped",
        summary.inserted, summary.skipped
    );
    if summary.failed_sources.is_empty() {
        println!("all sources healthy");
    } else {
        println!("failed sources: {}", summary.failed_sources.join(", "));
    }
}
