use std::io::{BufRead, Write};

use crate::error::{AppError, Result};

pub const TICKER_PROMPT: &str = "Enter the ticker symbol: ";
pub const THRESHOLD_PROMPT: &str = "Enter the drop threshold percentage: ";

/// Prompt for a ticker symbol. Surrounding whitespace is trimmed; the rest is
/// passed through as typed.
pub fn prompt_ticker<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<String> {
    let line = prompt_line(reader, writer, TICKER_PROMPT)?;
    if line.is_empty() {
        return Err(AppError::Input("ticker symbol must not be empty".to_string()));
    }
    Ok(line)
}

/// Prompt for the drop threshold, a whole number of percent.
pub fn prompt_threshold<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<i32> {
    let line = prompt_line(reader, writer, THRESHOLD_PROMPT)?;
    parse_threshold(&line)
}

pub fn parse_threshold(s: &str) -> Result<i32> {
    s.trim()
        .parse::<i32>()
        .map_err(|e| AppError::Input(format!("invalid drop threshold {s:?}: {e}")))
}

fn prompt_line<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, prompt: &str) -> Result<String> {
    write!(writer, "{prompt}")?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(AppError::Input("unexpected end of input".to_string()));
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_ticker_and_writes_prompt() {
        let mut input = Cursor::new("  ^GSPC \n");
        let mut output = Vec::new();
        let ticker = prompt_ticker(&mut input, &mut output).unwrap();
        assert_eq!(ticker, "^GSPC");
        assert_eq!(String::from_utf8(output).unwrap(), TICKER_PROMPT);
    }

    #[test]
    fn empty_ticker_is_rejected() {
        let mut input = Cursor::new("\n");
        let err = prompt_ticker(&mut input, &mut std::io::sink()).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }

    #[test]
    fn reads_threshold() {
        let mut input = Cursor::new("20\n");
        assert_eq!(prompt_threshold(&mut input, &mut std::io::sink()).unwrap(), 20);
    }

    #[test]
    fn non_integer_threshold_fails() {
        for bad in ["twenty", "20.5", "20%", ""] {
            assert!(
                matches!(parse_threshold(bad), Err(AppError::Input(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn both_prompts_in_sequence() {
        let mut input = Cursor::new("AAPL\n15\n");
        let mut output = Vec::new();
        let ticker = prompt_ticker(&mut input, &mut output).unwrap();
        let threshold = prompt_threshold(&mut input, &mut output).unwrap();
        assert_eq!((ticker.as_str(), threshold), ("AAPL", 15));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            format!("{TICKER_PROMPT}{THRESHOLD_PROMPT}")
        );
    }

    #[test]
    fn closed_stdin_is_input_error() {
        let mut input = Cursor::new("");
        assert!(matches!(
            prompt_threshold(&mut input, &mut std::io::sink()),
            Err(AppError::Input(_))
        ));
    }
}
