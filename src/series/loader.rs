//! Load a prepared price series from CSV
//!
//! Expects the output of the ingestion step: one row per sample, already merged
//! with inflation data. Rows without a value are dropped.

use super::{PricePoint, PriceSeries};
use crate::error::Result;
use chrono::NaiveDate;
use csv::Reader;
use log::debug;
use std::path::Path;

/// Raw CSV row; accepts the column names the ingestion step has used over time
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(alias = "datetime", alias = "Date")]
    date: String,
    #[serde(alias = "price", alias = "adj_close", alias = "real_price")]
    value: Option<f64>,
}

impl CsvRow {
    fn to_point(&self) -> Result<Option<PricePoint>> {
        let Some(value) = self.value else {
            return Ok(None);
        };
        // Timestamps like "2021-06-01 00:00:00" keep only the date part
        let date_part = self
            .date
            .trim()
            .split(|c: char| c == ' ' || c == 'T')
            .next()
            .unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")?;
        Ok(Some(PricePoint::new(date, value)))
    }
}

/// Load a price series from a CSV file
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
    let reader = Reader::from_path(path)?;
    read_series(reader)
}

/// Load a price series from any reader (e.g., string buffer, network stream)
pub fn load_series_from_reader<R: std::io::Read>(reader: R) -> Result<PriceSeries> {
    read_series(Reader::from_reader(reader))
}

fn read_series<R: std::io::Read>(mut reader: Reader<R>) -> Result<PriceSeries> {
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        match row.to_point()? {
            Some(point) => points.push(point),
            None => skipped += 1,
        }
    }

    debug!("loaded {} price rows, skipped {} without a value", points.len(), skipped);
    PriceSeries::new(points)
}
