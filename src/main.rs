use std::io::{self, Write};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use drawdown_recovery::analyzer::analyze;
use drawdown_recovery::config::Config;
use drawdown_recovery::error::Result;
use drawdown_recovery::fetcher::fetch_series;
use drawdown_recovery::input::{prompt_threshold, prompt_ticker};
use drawdown_recovery::report::render_report;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // Logs go to stderr so the report on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let (ticker, threshold) = {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut stdout = io::stdout();
        let ticker = prompt_ticker(&mut reader, &mut stdout)?;
        let threshold = prompt_threshold(&mut reader, &mut stdout)?;
        (ticker, threshold)
    };

    info!(
        ticker = %ticker,
        threshold,
        start = %cfg.start_date,
        end = %cfg.end_date,
        "Analyzing drawdowns"
    );

    let series = fetch_series(&cfg, &ticker).await?;
    let records = analyze(&series, f64::from(threshold));

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", render_report(&records, threshold))?;
    stdout.flush()?;

    Ok(())
}
