use crate::domain::errors::DataError;
use crate::domain::market::price_series::{PricePoint, PriceSeries};
use crate::domain::ports::PriceHistoryProvider;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One row of a daily history export. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct HistoryRecord {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Close", alias = "close", default)]
    close: Option<String>,
}

/// Reads `<data_dir>/<TICKER>.csv` files with `Date` and `Close` columns.
///
/// Rows whose close is missing or not a number (e.g. `null`) are dropped.
#[derive(Debug, Clone)]
pub struct CsvPriceHistoryProvider {
    data_dir: PathBuf,
}

impl CsvPriceHistoryProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", ticker.to_uppercase()))
    }

    /// Tickers with a CSV file in the data directory, sorted.
    pub fn available_tickers(&self) -> std::io::Result<Vec<String>> {
        let mut tickers: Vec<String> = std::fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().to_uppercase()))
            .collect();
        tickers.sort();
        Ok(tickers)
    }
}

impl PriceHistoryProvider for CsvPriceHistoryProvider {
    fn load(&self, ticker: &str) -> Result<PriceSeries, DataError> {
        if !is_valid_ticker(ticker) {
            return Err(DataError::NotFound {
                ticker: ticker.to_string(),
                reason: "invalid ticker symbol".to_string(),
            });
        }

        let path = self.path_for(ticker);
        let file = File::open(&path).map_err(|e| DataError::NotFound {
            ticker: ticker.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        debug!("Loading price history from {}", path.display());
        read_history(ticker, BufReader::new(file))
    }
}

fn is_valid_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '_'))
        && !ticker.starts_with('.')
}

/// Parses a history export into a validated series.
pub fn read_history<R: Read>(ticker: &str, reader: R) -> Result<PriceSeries, DataError> {
    let malformed = |reason: String| DataError::Malformed {
        ticker: ticker.to_string(),
        reason,
    };

    let mut rdr = csv::Reader::from_reader(reader);
    let mut points = Vec::new();
    let mut dropped = 0usize;

    for (line, result) in rdr.deserialize::<HistoryRecord>().enumerate() {
        let record = result.map_err(|e| malformed(e.to_string()))?;
        let Some(close) = record
            .close
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|c| c.is_finite())
        else {
            dropped += 1;
            continue;
        };
        let timestamp = parse_date(&record.date)
            .ok_or_else(|| malformed(format!("row {}: bad date '{}'", line + 1, record.date)))?;
        points.push(PricePoint { timestamp, close });
    }

    if dropped > 0 {
        warn!("{}: dropped {} rows without a close price", ticker, dropped);
    }
    PriceSeries::new(points)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,10,11,9,10.5,10.5,1000
2024-01-03,null,null,null,null,null,null
2024-01-04,10,12,10,11.25,11.25,1200
";

    #[test]
    fn test_reads_yahoo_layout_and_drops_missing() {
        let series = read_history("TEST", SAMPLE.as_bytes()).unwrap();
        assert_eq!(series.closes(), &[10.5, 11.25]);
    }

    #[test]
    fn test_rejects_bad_rows() {
        let bad_date = "Date,Close\nyesterday,10\n";
        assert!(matches!(
            read_history("X", bad_date.as_bytes()),
            Err(DataError::Malformed { .. })
        ));

        let unordered = "Date,Close\n2024-01-03,10\n2024-01-02,11\n";
        assert!(matches!(
            read_history("X", unordered.as_bytes()),
            Err(DataError::NonIncreasingTimestamp { index: 1 })
        ));

        assert_eq!(
            read_history("X", "Date,Close\n".as_bytes()),
            Err(DataError::EmptySeries)
        );
    }

    #[test]
    fn test_provider_reads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("ACME.csv")).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let provider = CsvPriceHistoryProvider::new(dir.path());
        assert_eq!(provider.load("acme").unwrap().len(), 2);
        assert_eq!(provider.available_tickers().unwrap(), vec!["ACME"]);
        assert!(matches!(
            provider.load("MISSING"),
            Err(DataError::NotFound { .. })
        ));
        assert!(matches!(
            provider.load("../etc/passwd"),
            Err(DataError::NotFound { .. })
        ));
    }
}
