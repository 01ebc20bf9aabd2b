//! Walk-forward simulation of staged investment plans

mod plan;
mod engine;
mod sample;

pub use plan::InvestmentPlan;
pub use engine::{
    build_schedule, simple_annualized_return, simulate, ReturnMethod, RollingReturnSimulator,
    SimulationConfig, DEFAULT_CONTRIBUTION, DEFAULT_HORIZON_YEARS,
};
pub use sample::{Histogram, HistogramBucket, ReturnObservation, ReturnSample, ReturnSummary};
