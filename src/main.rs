//! `fava` command line tool.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use fava_client::analysis::{select_galactic_catalog, summarize_weeks};
use fava_client::catalog::download_catalog;
use fava_client::config::FavaConfig;
use fava_client::ingest::fava::{build_catalog_urls, FavaClient};
use fava_client::logging::{self, DataSource};
use fava_client::model::validate_request;
use fava_client::verify::{print_summary, verify_portal, VerificationStatus};
use fava_client::WeeklySource;

#[derive(Parser, Debug)]
#[command(name = "fava", version, about = "Download and filter Fermi FAVA flare catalogs")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one week's flares as JSON
    Week {
        #[arg(long)]
        week: u32,
        /// Significance cutoff in sigma
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Download a range of weeks, optionally keeping only galactic flares
    Catalog {
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        end: Option<u32>,
        #[arg(long)]
        threshold: Option<f64>,
        /// Keep flares within DGALB degrees of the galactic plane
        /// (configured `dgalb` when given without a value)
        #[arg(long, value_name = "DGALB", num_args = 0..=1)]
        galactic: Option<Option<f64>>,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the URLs a catalog download would request, without fetching
    Urls {
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        end: Option<u32>,
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Check that the portal answers and still has the expected columns
    Verify {
        #[arg(long, default_value_t = 1)]
        week: u32,
    },
}

fn write_json<T: Serialize>(value: &T, output: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = FavaConfig::load(cli.config.as_deref())?;
    logging::init_logger(config.level()?, config.log_file.as_deref(), false)?;

    match cli.command {
        Command::Week { week, threshold } => {
            let threshold = threshold.unwrap_or(config.threshold);
            let portal = FavaClient::new(&config)?;
            let records = portal.fetch_week(week, threshold)?;
            write_json(&records, None)?;
        }

        Command::Catalog { start, end, threshold, galactic, output } => {
            let start = start.unwrap_or(config.start_week);
            let end = end.unwrap_or(config.end_week);
            let threshold = threshold.unwrap_or(config.threshold);

            let portal = FavaClient::new(&config)?;
            let mut catalog = download_catalog(&portal, start, end, threshold)?;
            if let Some(dgalb) = galactic {
                catalog = select_galactic_catalog(&catalog, dgalb.unwrap_or(config.dgalb));
            }

            for summary in summarize_weeks(catalog.records()) {
                logging::debug(
                    DataSource::Catalog,
                    Some(summary.week),
                    &format!("{} sources, max sigma {:?}", summary.sources, summary.max_sigma),
                );
            }
            write_json(&catalog, output.as_ref())?;
        }

        Command::Urls { start, end, threshold } => {
            let start = start.unwrap_or(config.start_week);
            let end = end.unwrap_or(config.end_week);
            let threshold = threshold.unwrap_or(config.threshold);
            validate_request(start, end, threshold)?;

            for url in build_catalog_urls(&config.api_url, start, end, threshold) {
                println!("{}", url);
            }
        }

        Command::Verify { week } => {
            let portal = FavaClient::new(&config)?;
            let report = verify_portal(portal.http(), &config, week);
            print_summary(&report);
            if report.status == VerificationStatus::Failed {
                return Err(report
                    .error_message
                    .unwrap_or_else(|| "portal verification failed".to_string())
                    .into());
            }
        }
    }

    Ok(())
}
