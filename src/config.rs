//! Configuration options for the mess preferences client

use std::time::Duration;

use crate::error::{Error, Result};
use crate::locator::DAY_WISE_FOLDER;

/// Read-only access to spreadsheet content
pub const SPREADSHEETS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";

/// Read-only access to file listings
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Environment variable holding the OAuth client identifier
pub const CLIENT_ID_ENV: &str = "GOOGLE_CLIENT_ID";

/// Configuration options for the mess preferences client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The OAuth client identifier
    pub client_id: String,

    /// Scopes requested from the identity provider
    pub scopes: Vec<String>,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Base URL of the Drive API
    pub drive_url: String,

    /// Base URL of the Sheets API
    pub sheets_url: String,

    /// OAuth token endpoint
    pub oauth_token_url: String,

    /// OAuth revocation endpoint
    pub oauth_revoke_url: String,

    /// Month folder to look in; the month name of today's date when unset
    pub month_folder: Option<String>,

    /// Name of the folder holding one spreadsheet per day
    pub day_wise_folder: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            scopes: vec![
                SPREADSHEETS_READONLY_SCOPE.to_string(),
                DRIVE_READONLY_SCOPE.to_string(),
            ],
            request_timeout: Some(Duration::from_secs(30)),
            drive_url: "https://www.googleapis.com".to_string(),
            sheets_url: "https://sheets.googleapis.com".to_string(),
            oauth_token_url: "https://oauth2.googleapis.com/token".to_string(),
            oauth_revoke_url: "https://oauth2.googleapis.com/revoke".to_string(),
            month_folder: None,
            day_wise_folder: DAY_WISE_FOLDER.to_string(),
        }
    }
}

impl ClientOptions {
    /// Default options with the client identifier taken from `GOOGLE_CLIENT_ID`
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var(CLIENT_ID_ENV)
            .map_err(|_| Error::config(format!("{} environment variable not found", CLIENT_ID_ENV)))?;
        if client_id.trim().is_empty() {
            return Err(Error::config(format!("{} is empty", CLIENT_ID_ENV)));
        }
        Ok(Self::default().with_client_id(&client_id))
    }

    /// Set the OAuth client identifier
    pub fn with_client_id(mut self, value: &str) -> Self {
        self.client_id = value.to_string();
        self
    }

    /// Replace the requested scopes
    pub fn with_scopes(mut self, value: &[&str]) -> Self {
        self.scopes = value.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the Drive API base URL
    pub fn with_drive_url(mut self, value: &str) -> Self {
        self.drive_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the Sheets API base URL
    pub fn with_sheets_url(mut self, value: &str) -> Self {
        self.sheets_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the OAuth token endpoint
    pub fn with_oauth_token_url(mut self, value: &str) -> Self {
        self.oauth_token_url = value.to_string();
        self
    }

    /// Set the OAuth revocation endpoint
    pub fn with_oauth_revoke_url(mut self, value: &str) -> Self {
        self.oauth_revoke_url = value.to_string();
        self
    }

    /// Pin the month folder instead of deriving it from today's date
    pub fn with_month_folder(mut self, value: &str) -> Self {
        self.month_folder = Some(value.to_string());
        self
    }

    /// Set the name of the day-wise sheets folder
    pub fn with_day_wise_folder(mut self, value: &str) -> Self {
        self.day_wise_folder = value.to_string();
        self
    }
}
