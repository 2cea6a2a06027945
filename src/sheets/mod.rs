//! Sheets v4 range reads

use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::Error;
use crate::fetch::Fetch;

/// Rows of cells as returned by a range read
pub type Grid = Vec<Vec<String>>;

/// Response body of `spreadsheets.values.get`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// The range the values cover
    #[serde(default)]
    pub range: Option<String>,

    /// ROWS or COLUMNS
    #[serde(default)]
    pub major_dimension: Option<String>,

    /// Absent when the range holds no data
    #[serde(default)]
    pub values: Option<Vec<Vec<Value>>>,
}

impl ValueRange {
    /// The values as strings, or `None` when the response carried none
    pub fn into_grid(self) -> Option<Grid> {
        self.values.map(|rows| {
            rows.into_iter()
                .map(|row| row.into_iter().map(cell_to_string).collect())
                .collect()
        })
    }
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 range covering `columns` of the sheet named `sheet_name`
pub fn a1_range(sheet_name: &str, columns: &str) -> String {
    format!("'{}'!{}", sheet_name.replace('\'', "''"), columns)
}

/// Client for the Sheets `spreadsheets.values` resource
#[derive(Debug, Clone)]
pub struct SheetsClient {
    /// Base URL of the Sheets API
    url: String,

    /// HTTP client used for requests
    client: Client,
}

impl SheetsClient {
    /// Create a new SheetsClient
    pub fn new(url: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<String, Error> {
        let mut url = Url::parse(&self.url)?;
        url.path_segments_mut()
            .map_err(|_| Error::general(format!("cannot use {} as a base URL", self.url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url.to_string())
    }

    /// Read `range` of the spreadsheet
    pub async fn get_values(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, Error> {
        let url = self.values_url(spreadsheet_id, range)?;
        debug!("Sheets values.get spreadsheet={} range={}", spreadsheet_id, range);

        Fetch::get(&self.client, &url)
            .bearer_auth(access_token)
            .execute::<ValueRange>()
            .await
    }
}
