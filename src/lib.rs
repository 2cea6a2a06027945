//! Mess preferences client
//!
//! Signs a user in with Google, finds today's preference spreadsheet under
//! `<year>/<month>/DayWiseSheets` on Google Drive, downloads it and lets the
//! caller look up one person's meal preferences by name.
//!
//! ```no_run
//! use mess_preferences::prelude::*;
//!
//! # async fn run() -> Result<(), Error> {
//! let app = MessPreferences::from_env()?;
//! app.auth().set_credentials(Credentials::AccessToken("ya29...".to_string()));
//!
//! let session = app.controller();
//! session.initialize().await;
//! session.sign_in().await;
//!
//! session.search("ali").await;
//! if let Some(card) = session.select(0).await {
//!     println!("{}: breakfast {}, lunch {}, dinner {}", card.name, card.breakfast, card.lunch, card.dinner);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod drive;
pub mod error;
pub mod fetch;
pub mod fetcher;
pub mod locator;
pub mod records;
pub mod service;
pub mod session;
pub mod sheets;

use std::sync::Arc;

use log::info;
use reqwest::Client;

use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::service::GoogleTableService;
use crate::session::SessionController;

/// The main entry point: one HTTP client shared by the identity gate and the table service
pub struct MessPreferences {
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
    auth: Arc<Auth>,
    tables: Arc<GoogleTableService>,
}

impl MessPreferences {
    /// Create a new client from options
    pub fn new(options: ClientOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(Error::Http)?;

        let auth = Arc::new(Auth::new(http_client.clone(), &options));
        let tables = Arc::new(GoogleTableService::new(http_client.clone(), &options));

        info!("Mess preferences client created (drive {}, sheets {})", options.drive_url, options.sheets_url);

        Ok(Self {
            http_client,
            options,
            auth,
            tables,
        })
    }

    /// Create a client whose OAuth client id comes from `GOOGLE_CLIENT_ID`
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::from_env()?)
    }

    /// The Google identity gate
    pub fn auth(&self) -> &Arc<Auth> {
        &self.auth
    }

    /// The Drive/Sheets table service
    pub fn tables(&self) -> &Arc<GoogleTableService> {
        &self.tables
    }

    /// A session controller wired to this client's gate and table service
    pub fn controller(&self) -> Arc<SessionController> {
        Arc::new(SessionController::new(
            self.auth.clone(),
            self.tables.clone(),
            self.options.clone(),
        ))
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::MessPreferences;
    pub use crate::auth::{Auth, Credentials, IdentityGate};
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::records::{PreferenceCard, RecordSet, Row};
    pub use crate::service::{GoogleTableService, TableService};
    pub use crate::session::{EmptyReason, SessionController, SessionState, SessionView};
}
