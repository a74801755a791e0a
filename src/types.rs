use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Price data
// ---------------------------------------------------------------------------

/// One trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Carried through from the data source; not used by the analysis.
    pub volume: f64,
}

/// Daily bars for one ticker, ascending by date with one bar per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series from bars in any order. When a date appears more than
    /// once the bar supplied last wins.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        // Stable sort keeps supply order within a date, so the last one survives the dedup below.
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            ticker: ticker.into(),
            bars: deduped,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}

// ---------------------------------------------------------------------------
// Derived quantities
// ---------------------------------------------------------------------------

/// Running all-time high as of one bar, and the date of the bar that set it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AthPoint {
    pub value: f64,
    pub date: NaiveDate,
}

/// A date whose drawdown from the running ATH fell inside the threshold band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownEvent {
    pub date: NaiveDate,
    pub ath_value: f64,
    pub ath_date: NaiveDate,
    pub low: f64,
    pub close: f64,
    /// Drawdown from the ATH, in percent, rounded to 2 decimals.
    pub drawdown_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryOutcome {
    /// A bar at or after the event reached the event's ATH.
    Recovered {
        recovery_date: NaiveDate,
        recovery_price: f64,
        /// Calendar days, not trading days.
        days_to_recover: i64,
    },
    /// Nothing through the end of the series reached the ATH.
    NotRecovered {
        as_of_date: NaiveDate,
        as_of_price: f64,
    },
}

impl RecoveryOutcome {
    pub fn status(&self) -> RecoveryStatus {
        match self {
            RecoveryOutcome::Recovered { .. } => RecoveryStatus::Recovered,
            RecoveryOutcome::NotRecovered { .. } => RecoveryStatus::NotRecovered,
        }
    }

    /// Recovery date, or the as-of date for unresolved events.
    pub fn date(&self) -> NaiveDate {
        match *self {
            RecoveryOutcome::Recovered { recovery_date, .. } => recovery_date,
            RecoveryOutcome::NotRecovered { as_of_date, .. } => as_of_date,
        }
    }

    /// Recovery price, or the latest close for unresolved events.
    pub fn price(&self) -> f64 {
        match *self {
            RecoveryOutcome::Recovered { recovery_price, .. } => recovery_price,
            RecoveryOutcome::NotRecovered { as_of_price, .. } => as_of_price,
        }
    }

    pub fn days_to_recover(&self) -> Option<i64> {
        match *self {
            RecoveryOutcome::Recovered { days_to_recover, .. } => Some(days_to_recover),
            RecoveryOutcome::NotRecovered { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    Recovered,
    NotRecovered,
}

impl std::fmt::Display for RecoveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecoveryStatus::Recovered => "Recovered",
            RecoveryStatus::NotRecovered => "Not Recovered",
        };
        write!(f, "{s}")
    }
}

/// One drawdown event together with how (or whether) it recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    pub drop_date: NaiveDate,
    pub ath_date: NaiveDate,
    pub ath_price: f64,
    pub drop_low: f64,
    pub drop_close: f64,
    pub drop_pct: f64,
    /// Recovery date, or the latest available date when not recovered.
    pub resolution_date: NaiveDate,
    /// Recovery high, or the latest close when not recovered.
    pub resolution_price: f64,
    /// Gain from the drop-day low to `resolution_price`, in percent.
    pub recovery_pct: f64,
    pub days_to_recover: Option<i64>,
    pub status: RecoveryStatus,
}

impl RecoveryRecord {
    pub fn from_event(event: &DrawdownEvent, outcome: RecoveryOutcome, recovery_pct: f64) -> Self {
        Self {
            drop_date: event.date,
            ath_date: event.ath_date,
            ath_price: event.ath_value,
            drop_low: event.low,
            drop_close: event.close,
            drop_pct: event.drawdown_pct,
            resolution_date: outcome.date(),
            resolution_price: outcome.price(),
            recovery_pct,
            days_to_recover: outcome.days_to_recover(),
            status: outcome.status(),
        }
    }

    pub fn is_recovered(&self) -> bool {
        self.status == RecoveryStatus::Recovered
    }
}
