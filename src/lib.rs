//! Drawdown and recovery analysis over daily price series.
//!
//! [`fetcher`] pulls a ticker's daily bars, [`analyzer::analyze`] finds the
//! days whose drawdown from the running all-time high falls within two points
//! of a threshold and measures how long each took to recover, and [`report`]
//! renders the result as text tables and summary statistics.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod input;
pub mod report;
pub mod types;

pub use analyzer::analyze;
pub use config::Config;
pub use error::{AppError, Result};
pub use types::{PriceBar, PriceSeries, RecoveryOutcome, RecoveryRecord, RecoveryStatus};
