//! The remote table service seam

use async_trait::async_trait;
use reqwest::Client;

use crate::config::ClientOptions;
use crate::drive::{DriveClient, EntryQuery, FileRef};
use crate::error::{Error, Result};
use crate::sheets::{Grid, SheetsClient};

/// File lookup and range reads against the cloud store
#[async_trait]
pub trait TableService: Send + Sync {
    /// Entries matching `query`, in service order
    async fn find_entries(&self, access_token: &str, query: &EntryQuery) -> Result<Vec<FileRef>>;

    /// Cell values of `range`; an empty grid when the range holds nothing
    async fn get_values(&self, access_token: &str, spreadsheet_id: &str, range: &str) -> Result<Grid>;
}

/// [`TableService`] backed by the Drive and Sheets REST APIs
#[derive(Debug, Clone)]
pub struct GoogleTableService {
    drive: DriveClient,
    sheets: SheetsClient,
}

impl GoogleTableService {
    pub fn new(client: Client, options: &ClientOptions) -> Self {
        Self {
            drive: DriveClient::new(&options.drive_url, client.clone()),
            sheets: SheetsClient::new(&options.sheets_url, client),
        }
    }
}

#[async_trait]
impl TableService for GoogleTableService {
    async fn find_entries(&self, access_token: &str, query: &EntryQuery) -> Result<Vec<FileRef>> {
        self.drive.list_files(access_token, query).await
    }

    async fn get_values(&self, access_token: &str, spreadsheet_id: &str, range: &str) -> Result<Grid> {
        let values = self
            .sheets
            .get_values(access_token, spreadsheet_id, range)
            .await
            .map_err(|e| match e {
                Error::Api { status, message } => {
                    Error::fetch(format!("range {} failed with status {}: {}", range, status, message))
                }
                other => other,
            })?;
        Ok(values.into_grid().unwrap_or_default())
    }
}
