use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{Config, CHART_INTERVAL, USER_AGENT};
use crate::error::{AppError, Result};
use crate::types::{PriceBar, PriceSeries};

// ---------------------------------------------------------------------------
// Chart response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    /// Absent when the range holds no trading days.
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds; bar timestamps are session opens in UTC.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    /// Split- and dividend-adjusted closes. Absent for some instruments.
    #[serde(default)]
    adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Column-oriented OHLCV arrays, index-aligned with `ChartResult::timestamp`.
/// Individual entries are null on days the exchange published no print.
#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Fetch daily bars for `ticker` over the configured window
/// (`start_date` inclusive, `end_date` exclusive).
pub async fn fetch_series(cfg: &Config, ticker: &str) -> Result<PriceSeries> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;

    let url = chart_url(cfg, ticker)?;
    debug!("GET {url}");

    let resp = client.get(url).query(&chart_query(cfg)).send().await?;
    let status_err = resp.error_for_status_ref().err();
    let body = resp.text().await?;

    // Unknown symbols come back as a 404 whose body still carries a chart error,
    // which says more than the bare status does.
    let series = match (parse_chart_response(ticker, &body), status_err) {
        (Err(e @ AppError::DataSource { .. }), _) => return Err(e),
        (_, Some(e)) => return Err(AppError::Http(e)),
        (result, None) => result?,
    };

    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        info!(
            ticker,
            bars = series.len(),
            first = %first.date,
            last = %last.date,
            "Fetched daily price series"
        );
    }
    Ok(series)
}

/// Chart endpoint URL for `ticker`. The symbol is percent-encoded as a
/// single path segment, so index symbols like `^GSPC` are safe to pass.
pub fn chart_url(cfg: &Config, ticker: &str) -> Result<Url> {
    let mut url = Url::parse(&cfg.chart_api_url)
        .map_err(|e| AppError::Config(format!("invalid CHART_API_URL {:?}: {e}", cfg.chart_api_url)))?;
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("CHART_API_URL {:?} cannot take a path", cfg.chart_api_url)))?
        .pop_if_empty()
        .extend(["v8", "finance", "chart", ticker]);
    Ok(url)
}

/// Query parameters selecting the configured window at daily resolution.
pub fn chart_query(cfg: &Config) -> [(&'static str, String); 3] {
    [
        ("period1", unix_midnight(cfg.start_date).to_string()),
        ("period2", unix_midnight(cfg.end_date).to_string()),
        ("interval", CHART_INTERVAL.to_string()),
    ]
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Decode a chart response body into a normalized `PriceSeries`.
///
/// Every row becomes one flat `PriceBar` dated by the exchange's local
/// calendar day. Rows missing any of open/high/low/close are dropped.
///
/// Prices are adjusted for splits and dividends: close is replaced by the
/// adjusted close and open/high/low are scaled by `adjclose / close`. Rows
/// without an adjusted close keep their raw prices.
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<PriceSeries> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        return Err(AppError::DataSource {
            code: err.code,
            description: err.description,
        });
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(AppError::NoData(ticker.to_string()));
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result.indicators.adjclose.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let column = |c: &[Option<f64>]| c.get(i).copied().flatten();
        let row = (
            trading_date(ts, offset),
            column(&quote.open),
            column(&quote.high),
            column(&quote.low),
            column(&quote.close),
        );
        match row {
            (Some(date), Some(open), Some(high), Some(low), Some(close)) => {
                let adj_close = column(&adjclose.adjclose).unwrap_or(close);
                let ratio = if close != 0.0 { adj_close / close } else { 1.0 };
                bars.push(PriceBar {
                    date,
                    open: open * ratio,
                    high: high * ratio,
                    low: low * ratio,
                    close: adj_close,
                    volume: column(&quote.volume).unwrap_or(0.0),
                })
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(ticker, skipped, "dropped rows with missing prices");
    }
    if bars.is_empty() {
        return Err(AppError::NoData(ticker.to_string()));
    }

    Ok(PriceSeries::new(ticker, bars))
}

/// Calendar date of a bar in the exchange's local time.
fn trading_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts + gmtoffset, 0).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_daily_chart() {
        // 2024-03-04 and 2024-03-05, 09:30 New York (14:30 UTC).
        let raw = r#"{"chart":{"result":[{"meta":{"symbol":"SPY","gmtoffset":-18000},"timestamp":[1709562600,1709649000],"indicators":{"quote":[{"open":[510.2,512.0],"high":[512.5,513.1],"low":[509.0,506.8],"close":[512.3,507.2],"volume":[61000000,72000000]}]}}],"error":null}}"#;
        let series = parse_chart_response("SPY", raw).unwrap();
        assert_eq!(series.ticker(), "SPY");
        assert_eq!(series.len(), 2);
        let first = series.bars()[0];
        assert_eq!(first.date, ymd(2024, 3, 4));
        assert!((first.high - 512.5).abs() < 1e-9);
        assert!((first.low - 509.0).abs() < 1e-9);
        assert!((first.volume - 61_000_000.0).abs() < 1e-3);
        assert_eq!(series.bars()[1].date, ymd(2024, 3, 5));
    }

    #[test]
    fn gmtoffset_shifts_to_local_day() {
        // 2024-03-04 23:00 UTC is already 2024-03-05 in Tokyo (+09:00).
        let raw = r#"{"chart":{"result":[{"meta":{"gmtoffset":32400},"timestamp":[1709593200],"indicators":{"quote":[{"open":[1.0],"high":[1.0],"low":[1.0],"close":[1.0],"volume":[0]}]}}],"error":null}}"#;
        let series = parse_chart_response("7203.T", raw).unwrap();
        assert_eq!(series.bars()[0].date, ymd(2024, 3, 5));
    }

    #[test]
    fn null_rows_are_dropped() {
        let raw = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"timestamp":[1709510400,1709596800,1709683200],"indicators":{"quote":[{"open":[1.0,null,3.0],"high":[1.5,null,3.5],"low":[0.5,null,2.5],"close":[1.2,null,3.2],"volume":[10,null,null]}]}}],"error":null}}"#;
        let series = parse_chart_response("X", raw).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[1].date, ymd(2024, 3, 6));
        assert_eq!(series.bars()[1].volume, 0.0);
    }

    #[test]
    fn chart_error_maps_to_data_source() {
        let raw = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        match parse_chart_response("NOPE", raw) {
            Err(AppError::DataSource { code, description }) => {
                assert_eq!(code, "Not Found");
                assert!(description.contains("delisted"));
            }
            other => panic!("expected DataSource, got {other:?}"),
        }
    }

    #[test]
    fn empty_range_is_no_data() {
        let raw = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(parse_chart_response("EMPTY", raw), Err(AppError::NoData(t)) if t == "EMPTY"));
    }

    #[test]
    fn garbage_is_json_error() {
        assert!(matches!(parse_chart_response("X", "<html>"), Err(AppError::Json(_))));
    }

    #[test]
    fn adjusted_close_rescales_the_bar() {
        // 2:1 split after this bar: adjusted close is half the raw close.
        let raw = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"timestamp":[1709510400],"indicators":{"quote":[{"open":[95.0],"high":[110.0],"low":[90.0],"close":[100.0],"volume":[500]}],"adjclose":[{"adjclose":[50.0]}]}}],"error":null}}"#;
        let bar = parse_chart_response("SPLIT", raw).unwrap().bars()[0];
        assert!((bar.close - 50.0).abs() < 1e-9);
        assert!((bar.high - 55.0).abs() < 1e-9);
        assert!((bar.low - 45.0).abs() < 1e-9);
        assert!((bar.open - 47.5).abs() < 1e-9);
        assert!((bar.volume - 500.0).abs() < 1e-9);
    }

    #[test]
    fn missing_adjusted_close_keeps_raw_prices() {
        let raw = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"timestamp":[1709510400,1709596800],"indicators":{"quote":[{"open":[10.0,20.0],"high":[11.0,22.0],"low":[9.0,18.0],"close":[10.0,20.0],"volume":[1,1]}],"adjclose":[{"adjclose":[5.0,null]}]}}],"error":null}}"#;
        let series = parse_chart_response("X", raw).unwrap();
        assert!((series.bars()[0].high - 5.5).abs() < 1e-9);
        assert!((series.bars()[1].high - 22.0).abs() < 1e-9);
        assert!((series.bars()[1].close - 20.0).abs() < 1e-9);
    }

    fn request_url(cfg: &Config, ticker: &str) -> String {
        reqwest::Client::new()
            .get(chart_url(cfg, ticker).unwrap())
            .query(&chart_query(cfg))
            .build()
            .unwrap()
            .url()
            .to_string()
    }

    #[test]
    fn chart_request_uses_window_and_interval() {
        assert_eq!(
            request_url(&Config::default(), "AAPL"),
            "https://query1.finance.yahoo.com/v8/finance/chart/AAPL?period1=1420070400&period2=1745020800&interval=1d"
        );
    }

    #[test]
    fn index_symbol_stays_one_path_segment() {
        let url = request_url(&Config::default(), "^GSPC");
        assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/"));
        assert!(url.contains("GSPC?period1=1420070400&"));
        assert_eq!(chart_url(&Config::default(), "^GSPC").unwrap().path_segments().unwrap().count(), 4);
    }

    #[test]
    fn unsafe_symbol_characters_are_escaped() {
        let url = chart_url(&Config::default(), "A B/C").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/A%20B%2FC");
    }

    #[test]
    fn base_url_with_trailing_slash() {
        let cfg = Config {
            chart_api_url: "http://127.0.0.1:8080/".to_string(),
            ..Config::default()
        };
        assert_eq!(chart_url(&cfg, "SPY").unwrap().as_str(), "http://127.0.0.1:8080/v8/finance/chart/SPY");
    }

    #[test]
    fn bad_base_url_is_config_error() {
        let cfg = Config {
            chart_api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(chart_url(&cfg, "SPY"), Err(AppError::Config(_))));
    }
}
