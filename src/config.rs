use chrono::NaiveDate;

use crate::error::{AppError, Result};

pub const CHART_API_URL: &str = "https://query1.finance.yahoo.com";

/// Default analysis window. The end date is exclusive.
pub const DEFAULT_START_DATE: &str = "2015-01-01";
pub const DEFAULT_END_DATE: &str = "2025-04-19";

/// Bar interval requested from the chart endpoint.
pub const CHART_INTERVAL: &str = "1d";

/// The chart endpoint rejects requests without a browser-like user agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) drawdown-recovery/0.1";

/// Half-width of the drawdown band in percentage points: events are dates whose
/// drawdown lies in `[threshold - BAND_HALF_WIDTH, threshold + BAND_HALF_WIDTH]`.
pub const BAND_HALF_WIDTH: f64 = 2.0;

/// Date format used for every date printed or parsed by the tool.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct Config {
    pub chart_api_url: String,
    pub log_level: String,
    /// First day of the analysis window (START_DATE)
    pub start_date: NaiveDate,
    /// Day after the last day of the analysis window (END_DATE)
    pub end_date: NaiveDate,
    /// Request timeout for the chart fetch (HTTP_TIMEOUT_SECS)
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let start_date = parse_date(
            "START_DATE",
            &std::env::var("START_DATE").unwrap_or_else(|_| DEFAULT_START_DATE.to_string()),
        )?;
        let end_date = parse_date(
            "END_DATE",
            &std::env::var("END_DATE").unwrap_or_else(|_| DEFAULT_END_DATE.to_string()),
        )?;
        if start_date >= end_date {
            return Err(AppError::Config(format!(
                "START_DATE ({start_date}) must be before END_DATE ({end_date})"
            )));
        }

        Ok(Self {
            chart_api_url: std::env::var("CHART_API_URL")
                .unwrap_or_else(|_| CHART_API_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            start_date,
            end_date,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .map_err(|_| {
                    AppError::Config("HTTP_TIMEOUT_SECS must be a whole number of seconds".to_string())
                })?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chart_api_url: CHART_API_URL.to_string(),
            log_level: "info".to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 4, 19).unwrap_or_default(),
            http_timeout_secs: 30,
        }
    }
}

fn parse_date(var: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Config(format!("{var} must be a YYYY-MM-DD date, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_matches_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.start_date.format(DATE_FORMAT).to_string(), DEFAULT_START_DATE);
        assert_eq!(cfg.end_date.format(DATE_FORMAT).to_string(), DEFAULT_END_DATE);
    }

    #[test]
    fn parse_date_accepts_padded_iso() {
        let d = parse_date("START_DATE", " 2020-03-16 ").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 3, 16).unwrap());
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let err = parse_date("END_DATE", "16/03/2020").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("END_DATE"));
    }
}
