//! Drive v3 file listings

mod types;

use log::debug;
use reqwest::Client;

use crate::error::Error;
use crate::fetch::Fetch;

pub use types::*;

/// Client for the Drive `files` resource
#[derive(Debug, Clone)]
pub struct DriveClient {
    /// Base URL of the Drive API
    url: String,

    /// HTTP client used for requests
    client: Client,
}

impl DriveClient {
    /// Create a new DriveClient
    pub fn new(url: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}/drive/v3{}", self.url, path)
    }

    /// List entries matching `query`, in the order Drive returns them
    pub async fn list_files(&self, access_token: &str, query: &EntryQuery) -> Result<Vec<FileRef>, Error> {
        let q = query.to_query_string();
        debug!("Drive files.list q={}", q);

        let list = Fetch::get(&self.client, &self.get_url("/files"))
            .bearer_auth(access_token)
            .query("q", &q)
            .query("fields", LIST_FIELDS)
            .execute::<FileList>()
            .await?;

        debug!("Drive returned {} file(s)", list.files.len());
        Ok(list.files)
    }
}
