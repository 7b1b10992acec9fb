use std::io::Read;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use common::Bar;

/// One row of a `timestamp,open,high,low,close,volume` file.
#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Read bars from CSV, oldest first. Timestamps are RFC 3339 or Unix time in
/// seconds or milliseconds.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();
    for (line, row) in csv_reader.deserialize::<CsvBar>().enumerate() {
        let row = row.with_context(|| format!("malformed bar on data row {}", line + 1))?;
        bars.push(Bar {
            timestamp: parse_timestamp(&row.timestamp)
                .with_context(|| format!("bad timestamp on data row {}", line + 1))?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    Ok(bars)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        // anything past year 5138 in seconds is taken as milliseconds
        let parsed = if n.abs() < 100_000_000_000 {
            Utc.timestamp_opt(n, 0).single()
        } else {
            Utc.timestamp_millis_opt(n).single()
        };
        return match parsed {
            Some(ts) => Ok(ts),
            None => bail!("timestamp {n} out of range"),
        };
    }
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}
