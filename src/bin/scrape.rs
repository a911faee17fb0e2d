//! One-shot journey search straight against the carrier, bypassing the cache.
//!
//! Prints the carrier's trip records as pretty JSON.

use chrono::NaiveDate;
use clap::Parser;
use thiserror::Error;

use journey_search::carrier::{CarrierAdapter, CarrierRequest, RegioJetClient};
use journey_search::config::CarrierConfig;
use journey_search::models::Journey;

/// Accepted date formats for the DATE argument
const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];

#[derive(Debug, Error)]
#[error("date {0} doesn't match formats {formats:?}", formats = DATE_FORMATS)]
struct ScrapeArgError(String);

/// Search RegioJet journeys for a single day
#[derive(Parser, Debug)]
#[command(name = "journey-scrape")]
#[command(version)]
struct Cli {
    /// Origin city, e.g. Praha
    src: String,
    /// Destination city, e.g. Brno
    dst: String,
    /// Departure date, DD-MM-YYYY or YYYY-MM-DD
    #[arg(value_parser = parse_date)]
    date: NaiveDate,
}

fn parse_date(value: &str) -> Result<NaiveDate, ScrapeArgError> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| ScrapeArgError(value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let client = RegioJetClient::from_config(&CarrierConfig::default())?;
    let request = CarrierRequest {
        origin: cli.src,
        destination: cli.dst,
        date: cli.date,
    };

    let journeys: Vec<Journey> = client
        .fetch(&request)
        .await?
        .into_iter()
        .map(Journey::from)
        .collect();

    println!("{}", serde_json::to_string_pretty(&journeys)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_day_first_dates() {
        assert_eq!(parse_date("01-06-2024").unwrap(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn accepts_iso_dates() {
        assert_eq!(parse_date("2024-06-01").unwrap(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn rejects_other_formats_with_hint() {
        let err = parse_date("06/01/2024").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("06/01/2024"));
        assert!(message.contains("%d-%m-%Y"));
    }
}
