//! Investment plans: when equal-sized contributions happen relative to an anchor

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sorted, deduplicated, non-negative day offsets from a plan's anchor date
///
/// Deserialization goes through [`InvestmentPlan::new`], so a decoded plan holds
/// the same invariants as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlan")]
pub struct InvestmentPlan {
    offsets: Vec<f64>,
}

/// Wire shape of a plan before validation
#[derive(Deserialize)]
struct RawPlan {
    offsets: Vec<f64>,
}

impl TryFrom<RawPlan> for InvestmentPlan {
    type Error = Error;

    fn try_from(raw: RawPlan) -> Result<Self> {
        Self::new(raw.offsets)
    }
}

impl InvestmentPlan {
    pub fn new(mut offsets: Vec<f64>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(Error::invalid_plan("plan needs at least one offset"));
        }
        if let Some(bad) = offsets.iter().find(|o| !o.is_finite() || **o < 0.0) {
            return Err(Error::invalid_plan(format!(
                "offset {} is not a non-negative number of days",
                bad
            )));
        }

        offsets.sort_by(|a, b| a.total_cmp(b));
        offsets.dedup();
        Ok(Self { offsets })
    }

    /// Everything invested on the anchor date
    pub fn lump_sum() -> Self {
        Self { offsets: vec![0.0] }
    }

    /// `contributions` equal contributions, `spacing_days` apart, starting at the anchor
    pub fn staged(contributions: usize, spacing_days: f64) -> Result<Self> {
        if contributions == 0 {
            return Err(Error::invalid_plan("staged plan needs at least one contribution"));
        }
        if contributions > 1 && !(spacing_days.is_finite() && spacing_days > 0.0) {
            return Err(Error::invalid_plan(format!(
                "spacing {} must be a positive number of days",
                spacing_days
            )));
        }
        Self::new((0..contributions).map(|i| i as f64 * spacing_days).collect())
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Number of contributions
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn last_offset(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }
}

impl fmt::Display for InvestmentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.offsets.iter().map(|o| format!("{}", o)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
