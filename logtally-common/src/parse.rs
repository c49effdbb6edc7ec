//! Access-log line parsing

use thiserror::Error;

/// Minimum number of whitespace-delimited tokens a line must carry.
///
/// A well-formed line looks like
/// `192.168.1.1 - [date] "GET /projects/260 HTTP/1.1" 200 1024`;
/// anything shorter cannot hold a status code and a byte count in its
/// final two positions.
pub const MIN_TOKENS: usize = 7;

/// A successfully parsed access-log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    /// HTTP status code from the second-to-last token
    pub status: u16,

    /// Response body size in bytes from the last token
    pub bytes: u64,
}

/// Why a line was rejected by the parser
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected at least {MIN_TOKENS} tokens, got {0}")]
    TooFewTokens(usize),

    #[error("status code field is not numeric: {0:?}")]
    BadStatusCode(String),

    #[error("file size field is not numeric: {0:?}")]
    BadFileSize(String),
}

/// Parse one input line (trailing newline already stripped).
///
/// Matching is deliberately loose: the line is accepted when it splits
/// into at least [`MIN_TOKENS`] whitespace-delimited tokens and the last
/// two parse as unsigned integers. The request-line tokens themselves are
/// not validated. A rejected line contributes nothing to the metrics.
pub fn parse_line(line: &str) -> Result<LogRecord, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_TOKENS {
        return Err(ParseError::TooFewTokens(tokens.len()));
    }

    let size_token = tokens[tokens.len() - 1];
    let status_token = tokens[tokens.len() - 2];

    let status = status_token
        .parse::<u16>()
        .map_err(|_| ParseError::BadStatusCode(status_token.to_string()))?;
    let bytes = size_token
        .parse::<u64>()
        .map_err(|_| ParseError::BadFileSize(size_token.to_string()))?;

    Ok(LogRecord { status, bytes })
}
