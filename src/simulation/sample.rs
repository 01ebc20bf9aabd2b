//! Simulation output: per-anchor observations and their summary statistics

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Annualized return (percent) of the plan anchored at `start_date`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    pub start_date: NaiveDate,
    pub ror: f64,
}

/// Observations of one simulation run, ascending by start date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSample {
    observations: Vec<ReturnObservation>,
}

impl ReturnSample {
    pub fn new(observations: Vec<ReturnObservation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[ReturnObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Raw return values in start-date order, for external rendering
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.ror).collect()
    }

    /// Summary statistics; an empty sample has none
    pub fn summary(&self) -> Result<ReturnSummary> {
        if self.is_empty() {
            return Err(Error::NoEligibleWindow);
        }

        let mut values = self.values();
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        values.sort_by(|a, b| a.total_cmp(b));

        Ok(ReturnSummary {
            count,
            mean,
            std_dev,
            p2_5: percentile(&values, 2.5),
            p97_5: percentile(&values, 97.5),
            min: values[0],
            max: values[count - 1],
        })
    }

    /// Equal-width frequency distribution of the return values
    pub fn histogram(&self, bucket_count: usize) -> Result<Histogram> {
        if bucket_count == 0 {
            return Err(Error::invalid_parameter("histogram needs at least one bucket"));
        }
        if self.is_empty() {
            return Err(Error::NoEligibleWindow);
        }

        let values = self.values();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        // All observations identical
        if span <= 0.0 {
            return Ok(Histogram {
                buckets: vec![HistogramBucket {
                    label: format!("[{:.2}, {:.2}]", min, max),
                    lower: min,
                    upper: max,
                    count: values.len(),
                }],
            });
        }

        let width = span / bucket_count as f64;
        let mut counts = vec![0usize; bucket_count];
        for v in &values {
            let idx = (((v - min) / width).floor() as usize).min(bucket_count - 1);
            counts[idx] += 1;
        }

        let buckets = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let lower = min + i as f64 * width;
                let upper = if i + 1 == bucket_count {
                    max
                } else {
                    min + (i + 1) as f64 * width
                };
                let close = if i + 1 == bucket_count { ']' } else { ')' };
                HistogramBucket {
                    label: format!("[{:.2}, {:.2}{}", lower, upper, close),
                    lower,
                    upper,
                    count,
                }
            })
            .collect();

        Ok(Histogram { buckets })
    }
}

/// Summary scalars handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    pub p2_5: f64,
    pub p97_5: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Labelled frequency distribution of return values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Linear interpolation between closest ranks; `sorted` must be ascending and non-empty
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        sorted[lower] * (1.0 - w) + sorted[upper] * w
    }
}
