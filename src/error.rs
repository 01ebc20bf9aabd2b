//! Error types shared by the lookup, valuation and simulation modules

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for walk-forward operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the analytical core and its loaders
#[derive(Error, Debug)]
pub enum Error {
    /// No usable price data
    #[error("price series is empty")]
    EmptySeries,

    /// Statistics were requested from a run where no anchor had enough forward data
    #[error("no eligible window: horizon exceeds the available price history")]
    NoEligibleWindow,

    /// IRR is undefined when all cash flows share one sign
    #[error("cash flows need at least one investment and one divestment")]
    NoSignChange,

    /// Root finder hit its iteration bound (or could not bracket a root)
    #[error("IRR did not converge after {iterations} iterations (npv residual {residual})")]
    NonConvergence { iterations: u32, residual: f64 },

    /// Bounded lookup target falls outside the series
    #[error("date {target} outside series range {first}..={last}")]
    OutOfRange {
        target: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },

    #[error("invalid price series: {message}")]
    InvalidSeries { message: String },

    #[error("invalid investment plan: {message}")]
    InvalidPlan { message: String },

    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),
}

impl Error {
    pub fn invalid_series(message: impl Into<String>) -> Self {
        Self::InvalidSeries {
            message: message.into(),
        }
    }

    pub fn invalid_plan(message: impl Into<String>) -> Self {
        Self::InvalidPlan {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
