//! Load a cash-flow schedule from CSV (`date,amount`)

use super::{CashFlow, CashFlowSchedule};
use crate::error::Result;
use chrono::NaiveDate;
use csv::Reader;
use std::path::Path;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(alias = "datetime")]
    date: String,
    #[serde(alias = "flows", alias = "flow")]
    amount: f64,
}

impl CsvRow {
    fn to_flow(&self) -> Result<CashFlow> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")?;
        Ok(CashFlow::new(date, self.amount))
    }
}

/// Load a schedule from a CSV file
pub fn load_schedule<P: AsRef<Path>>(path: P) -> Result<CashFlowSchedule> {
    read_schedule(Reader::from_path(path)?)
}

/// Load a schedule from any reader
pub fn load_schedule_from_reader<R: std::io::Read>(reader: R) -> Result<CashFlowSchedule> {
    read_schedule(Reader::from_reader(reader))
}

fn read_schedule<R: std::io::Read>(mut reader: Reader<R>) -> Result<CashFlowSchedule> {
    let mut flows = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        flows.push(row.to_flow()?);
    }
    Ok(CashFlowSchedule::new(flows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_schedule_from_reader() {
        let data = "datetime,flows\n1983-01-01,500\n1981-01-01,-1000\n1985-01-01,800\n";
        let schedule = load_schedule_from_reader(data.as_bytes()).unwrap();

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.earliest(), NaiveDate::from_ymd_opt(1981, 1, 1));
        assert_eq!(schedule.flows()[0].amount, -1000.0);
    }
}
