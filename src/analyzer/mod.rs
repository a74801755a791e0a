pub mod ath;
pub mod recovery;

pub use ath::{drawdown_percent, in_band, running_ath, select_events};
pub use recovery::{analyze, find_recovery, recovery_percent};

/// Rounds to 2 decimal places, ties to even.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
