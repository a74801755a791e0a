use tracing::{debug, trace};

use crate::analyzer::ath::select_events;
use crate::analyzer::round2;
use crate::config::BAND_HALF_WIDTH;
use crate::types::{DrawdownEvent, PriceSeries, RecoveryOutcome, RecoveryRecord};

/// Finds the first bar on or after the event date whose high reaches the
/// event's ATH. The event's own bar is included in the search, so an event
/// whose high already equals the ATH recovers after 0 days.
pub fn find_recovery(series: &PriceSeries, event: &DrawdownEvent) -> RecoveryOutcome {
    let bars = series.bars();
    let start = bars.partition_point(|b| b.date < event.date);

    if let Some(bar) = bars[start..].iter().find(|b| b.high >= event.ath_value) {
        let days_to_recover = (bar.date - event.date).num_days();
        trace!(
            drop_date = %event.date,
            recovery_date = %bar.date,
            days_to_recover,
            "drawdown recovered"
        );
        return RecoveryOutcome::Recovered {
            recovery_date: bar.date,
            recovery_price: bar.high,
            days_to_recover,
        };
    }

    let (as_of_date, as_of_price) = series
        .last()
        .map(|b| (b.date, b.close))
        .unwrap_or((event.date, event.close));
    trace!(drop_date = %event.date, %as_of_date, "drawdown not recovered");
    RecoveryOutcome::NotRecovered {
        as_of_date,
        as_of_price,
    }
}

/// Percent gain from `low` to `price`, rounded to 2 decimals.
pub fn recovery_percent(price: f64, low: f64) -> f64 {
    round2((price - low) / low * 100.0)
}

/// Runs the full drawdown/recovery analysis: one record per bar whose
/// drawdown from the running ATH lies within 2 points of `threshold`,
/// ascending by drop date. An empty series yields no records.
pub fn analyze(series: &PriceSeries, threshold: f64) -> Vec<RecoveryRecord> {
    let events = select_events(series, threshold);
    debug!(
        ticker = series.ticker(),
        bars = series.len(),
        events = events.len(),
        band_low = threshold - BAND_HALF_WIDTH,
        band_high = threshold + BAND_HALF_WIDTH,
        "drawdown events selected"
    );

    events
        .iter()
        .map(|event| {
            let outcome = find_recovery(series, event);
            let pct = recovery_percent(outcome.price(), event.low);
            RecoveryRecord::from_event(event, outcome, pct)
        })
        .collect()
}
