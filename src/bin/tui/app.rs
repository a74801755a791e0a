use chrono::NaiveDate;
use ratatui::widgets::TableState;

use drawdown_recovery::report::{split, ReportSummary};
use drawdown_recovery::types::RecoveryRecord;

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

/// Which table the scroll keys move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Unrecovered,
    Recovered,
}

impl Pane {
    pub fn toggle(self) -> Self {
        match self {
            Pane::Unrecovered => Pane::Recovered,
            Pane::Recovered => Pane::Unrecovered,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub ticker: String,
    pub threshold: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub unrecovered: Vec<RecoveryRecord>,
    pub recovered: Vec<RecoveryRecord>,
    pub summary: ReportSummary,
    pub focus: Pane,
    pub unrecovered_state: TableState,
    pub recovered_state: TableState,
}

impl AppState {
    pub fn new(
        ticker: String,
        threshold: i32,
        window: (NaiveDate, NaiveDate),
        records: &[RecoveryRecord],
    ) -> Self {
        let (unrecovered, recovered) = split(records);
        let unrecovered: Vec<RecoveryRecord> = unrecovered.into_iter().cloned().collect();
        let recovered: Vec<RecoveryRecord> = recovered.into_iter().cloned().collect();

        // Start on whichever table has rows, unrecovered first like the text report.
        let focus = if unrecovered.is_empty() && !recovered.is_empty() {
            Pane::Recovered
        } else {
            Pane::Unrecovered
        };

        Self {
            ticker,
            threshold,
            start_date: window.0,
            end_date: window.1,
            summary: ReportSummary::from_records(records),
            unrecovered,
            recovered,
            focus,
            unrecovered_state: TableState::default(),
            recovered_state: TableState::default(),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggle();
    }

    pub fn select_next(&mut self) {
        let (len, state) = self.focused_mut();
        let max = len.saturating_sub(1);
        let next = state.selected().map_or(0, |i| (i + 1).min(max));
        if len > 0 {
            state.select(Some(next));
        }
    }

    pub fn select_prev(&mut self) {
        let (len, state) = self.focused_mut();
        let prev = state.selected().map_or(0, |i| i.saturating_sub(1));
        if len > 0 {
            state.select(Some(prev));
        }
    }

    fn focused_mut(&mut self) -> (usize, &mut TableState) {
        match self.focus {
            Pane::Unrecovered => (self.unrecovered.len(), &mut self.unrecovered_state),
            Pane::Recovered => (self.recovered.len(), &mut self.recovered_state),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total == 0
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_stat_days(days: Option<f64>) -> String {
    days.map_or("—".to_string(), |d| format!("{d:.0}d"))
}

/// Colour bucket for a recovery duration: under a quarter, under a year, longer.
pub fn recovery_speed(days: i64) -> Speed {
    if days <= 90 {
        Speed::Fast
    } else if days <= 365 {
        Speed::Moderate
    } else {
        Speed::Slow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Fast,
    Moderate,
    Slow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_recovery::types::RecoveryStatus;

    fn record(day: u32, days_to_recover: Option<i64>) -> RecoveryRecord {
        let d = NaiveDate::from_ymd_opt(2022, 6, day).unwrap();
        RecoveryRecord {
            drop_date: d,
            ath_date: NaiveDate::from_ymd_opt(2021, 11, 19).unwrap(),
            ath_price: 100.0,
            drop_low: 80.0,
            drop_close: 81.0,
            drop_pct: 20.0,
            resolution_date: d,
            resolution_price: 90.0,
            recovery_pct: 12.5,
            days_to_recover,
            status: if days_to_recover.is_some() {
                RecoveryStatus::Recovered
            } else {
                RecoveryStatus::NotRecovered
            },
        }
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 19).unwrap(),
        )
    }

    #[test]
    fn splits_and_focuses_unrecovered_first() {
        let app = AppState::new("QQQ".into(), 20, window(), &[record(1, None), record(2, Some(30))]);
        assert_eq!(app.unrecovered.len(), 1);
        assert_eq!(app.recovered.len(), 1);
        assert_eq!(app.focus, Pane::Unrecovered);
    }

    #[test]
    fn focuses_recovered_when_nothing_pending() {
        let app = AppState::new("QQQ".into(), 20, window(), &[record(2, Some(30))]);
        assert_eq!(app.focus, Pane::Recovered);
    }

    #[test]
    fn selection_clamps_to_table() {
        let mut app = AppState::new(
            "QQQ".into(),
            20,
            window(),
            &[record(1, Some(3)), record(2, Some(4))],
        );
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.recovered_state.selected(), Some(1));
        app.select_prev();
        app.select_prev();
        assert_eq!(app.recovered_state.selected(), Some(0));
    }

    #[test]
    fn empty_table_keeps_no_selection() {
        let mut app = AppState::new("QQQ".into(), 20, window(), &[]);
        assert!(app.is_empty());
        app.select_next();
        assert_eq!(app.unrecovered_state.selected(), None);
    }

    #[test]
    fn speed_buckets() {
        assert_eq!(recovery_speed(0), Speed::Fast);
        assert_eq!(recovery_speed(200), Speed::Moderate);
        assert_eq!(recovery_speed(900), Speed::Slow);
    }

    #[test]
    fn stat_days_formatting() {
        assert_eq!(format_stat_days(Some(42.0)), "42d");
        assert_eq!(format_stat_days(None), "—");
    }
}
