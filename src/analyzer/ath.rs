use crate::analyzer::round2;
use crate::config::BAND_HALF_WIDTH;
use crate::types::{AthPoint, DrawdownEvent, PriceBar, PriceSeries};

/// Running all-time high of `high`, one point per bar.
///
/// The tracked maximum moves whenever a bar's high is greater than or equal to
/// it, so a bar that ties the ATH becomes the new ATH date.
pub fn running_ath(bars: &[PriceBar]) -> Vec<AthPoint> {
    let mut current: Option<AthPoint> = None;
    bars.iter()
        .map(|bar| {
            let point = match current {
                Some(p) if bar.high < p.value => p,
                _ => AthPoint {
                    value: bar.high,
                    date: bar.date,
                },
            };
            current = Some(point);
            point
        })
        .collect()
}

/// Percent decline of `low` below `ath`, rounded to 2 decimals.
pub fn drawdown_percent(ath: f64, low: f64) -> f64 {
    round2((ath - low) / ath * 100.0)
}

/// True if `drawdown_pct` lies in `[threshold - 2, threshold + 2]`, bounds included.
pub fn in_band(drawdown_pct: f64, threshold: f64) -> bool {
    drawdown_pct >= threshold - BAND_HALF_WIDTH && drawdown_pct <= threshold + BAND_HALF_WIDTH
}

/// Every bar whose drawdown from the running ATH falls in the threshold band,
/// in date order. Consecutive qualifying days are separate events.
pub fn select_events(series: &PriceSeries, threshold: f64) -> Vec<DrawdownEvent> {
    let bars = series.bars();
    bars.iter()
        .zip(running_ath(bars))
        .filter_map(|(bar, ath)| {
            let drawdown_pct = drawdown_percent(ath.value, bar.low);
            in_band(drawdown_pct, threshold).then(|| DrawdownEvent {
                date: bar.date,
                ath_value: ath.value,
                ath_date: ath.date,
                low: bar.low,
                close: bar.close,
                drawdown_pct,
            })
        })
        .collect()
}
