//! Error handling for the mess preferences client

use std::fmt;
use thiserror::Error;

/// The folder-walk step that came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStep {
    /// The folder named after the current year
    YearFolder,
    /// The month folder inside the year folder
    MonthFolder,
    /// The day-wise sheets folder inside the month folder
    DayWiseFolder,
    /// The spreadsheet listing of the day-wise folder
    Sheets,
    /// A spreadsheet whose name carries today's date
    TodaySheet,
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::YearFolder => "year folder",
            Self::MonthFolder => "month folder",
            Self::DayWiseFolder => "day-wise folder",
            Self::Sheets => "no sheets",
            Self::TodaySheet => "no sheet for today",
        };
        f.write_str(label)
    }
}

/// Unified error type for the mess preferences client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identity gate unavailable or sign-in rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A folder-walk step yielded zero results
    #[error("Not found: {0}")]
    NotFound(LookupStep),

    /// Range retrieval failed or returned no values
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The sheet was fetched but holds no rows after the header
    #[error("Sheet has no rows")]
    EmptyResult,

    /// Non-success status from a remote API
    #[error("Request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new fetch error
    pub fn fetch<T: fmt::Display>(msg: T) -> Self {
        Error::Fetch(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
