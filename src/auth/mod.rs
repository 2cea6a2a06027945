//! Identity gate: sign-in state and access tokens for the Google APIs

mod listeners;
mod session;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::sync::{PoisonError, RwLock};

use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::fetch::Fetch;

pub use listeners::*;
pub use session::*;

/// Sign-in capability consumed by the session controller
#[async_trait]
pub trait IdentityGate: Send + Sync {
    /// Prepare the gate for `client_id` with the given scopes
    async fn initialize(&self, client_id: &str, scopes: &[String]) -> Result<()>;

    /// Whether the gate has been initialized
    fn is_initialized(&self) -> bool;

    /// Current signed-in flag
    fn is_signed_in(&self) -> bool;

    /// Register a handler called with the new flag on every signed-in change
    fn subscribe(&self, handler: SignedInHandler) -> Subscription;

    async fn sign_in(&self) -> Result<()>;

    async fn sign_out(&self) -> Result<()>;

    /// Drop cached consent so the next sign-in prompts for scopes again
    async fn disconnect(&self) -> Result<()>;

    /// Access token of the current session, if signed in and not expired
    fn access_token(&self) -> Option<String>;
}

/// How [`Auth`] obtains an access token
#[derive(Debug, Clone)]
pub enum Credentials {
    /// A token obtained elsewhere, used as-is
    AccessToken(String),
    /// A refresh token exchanged at the OAuth token endpoint
    RefreshToken {
        refresh_token: String,
        client_secret: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    scope: Option<String>,
}

#[derive(Default)]
struct AuthState {
    client_id: Option<String>,
    scopes: Vec<String>,
    credentials: Option<Credentials>,
    session: Option<Session>,
}

/// Google OAuth identity gate
pub struct Auth {
    /// HTTP client used for requests
    client: Client,

    /// OAuth token endpoint
    token_url: String,

    /// OAuth revocation endpoint
    revoke_url: String,

    state: RwLock<AuthState>,

    listeners: SignedInListeners,
}

impl Auth {
    /// Create a new Auth client
    pub fn new(client: Client, options: &ClientOptions) -> Self {
        Self {
            client,
            token_url: options.oauth_token_url.clone(),
            revoke_url: options.oauth_revoke_url.clone(),
            state: RwLock::new(AuthState::default()),
            listeners: SignedInListeners::new(),
        }
    }

    /// Set the credentials used by the next sign-in
    pub fn set_credentials(&self, credentials: Credentials) {
        self.write_state().credentials = Some(credentials);
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    async fn exchange_refresh_token(
        &self,
        client_id: &str,
        refresh_token: &str,
        client_secret: Option<&str>,
    ) -> Result<Session> {
        debug!("Exchanging refresh token at {}", self.token_url);

        let mut fields = vec![
            ("client_id", client_id),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        if let Some(secret) = client_secret {
            fields.push(("client_secret", secret));
        }

        let token = Fetch::post(&self.client, &self.token_url)
            .form(&fields)
            .execute::<TokenResponse>()
            .await
            .map_err(|e| match e {
                Error::Api { status, message } => {
                    Error::auth(format!("token exchange rejected ({}): {}", status, message))
                }
                other => other,
            })?;

        Ok(Session::new(token.access_token, token.expires_in, token.scope))
    }
}

#[async_trait]
impl IdentityGate for Auth {
    async fn initialize(&self, client_id: &str, scopes: &[String]) -> Result<()> {
        if client_id.trim().is_empty() {
            return Err(Error::auth("client id is empty"));
        }
        if scopes.is_empty() {
            return Err(Error::auth("no scopes requested"));
        }

        let mut state = self.write_state();
        state.client_id = Some(client_id.to_string());
        state.scopes = scopes.to_vec();
        info!("Identity gate initialized for client {}", client_id);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.read_state().client_id.is_some()
    }

    fn is_signed_in(&self) -> bool {
        self.read_state()
            .session
            .as_ref()
            .map(|s| !s.is_expired())
            .unwrap_or(false)
    }

    fn subscribe(&self, handler: SignedInHandler) -> Subscription {
        self.listeners.subscribe(handler)
    }

    async fn sign_in(&self) -> Result<()> {
        let (client_id, scopes, credentials) = {
            let state = self.read_state();
            let client_id = state
                .client_id
                .clone()
                .ok_or_else(|| Error::auth("identity gate not initialized"))?;
            let credentials = state
                .credentials
                .clone()
                .ok_or_else(|| Error::auth("no credentials; consent is required"))?;
            (client_id, state.scopes.clone(), credentials)
        };

        info!("Signing in...");
        let session = match credentials {
            Credentials::AccessToken(token) => Session::new(token, None, None),
            Credentials::RefreshToken {
                refresh_token,
                client_secret,
            } => {
                self.exchange_refresh_token(&client_id, &refresh_token, client_secret.as_deref())
                    .await?
            }
        };

        let missing = session.missing_scopes(&scopes);
        if !missing.is_empty() {
            warn!("Granted token lacks scopes: {:?}", missing);
            return Err(Error::auth(format!("missing scopes: {}", missing.join(" "))));
        }

        let was_signed_in = self.is_signed_in();
        self.write_state().session = Some(session);
        if !was_signed_in {
            self.listeners.notify(true);
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(Error::auth("identity gate not initialized"));
        }

        info!("Signing out...");
        let previous = self.write_state().session.take();
        if previous.is_some() {
            self.listeners.notify(false);
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let token = {
            let mut state = self.write_state();
            let from_session = state.session.take().map(|s| s.access_token);
            let from_credentials = match state.credentials.take() {
                Some(Credentials::RefreshToken { refresh_token, .. }) => Some(refresh_token),
                Some(Credentials::AccessToken(token)) => Some(token),
                None => None,
            };
            // Revoking the refresh token also revokes its access tokens.
            from_credentials.or(from_session)
        };

        let Some(token) = token else {
            debug!("Nothing to revoke");
            return Ok(());
        };

        debug!("Revoking consent at {}", self.revoke_url);
        Fetch::post(&self.client, &self.revoke_url)
            .query("token", &token)
            .execute_empty()
            .await
            .map_err(|e| Error::auth(format!("revocation failed: {}", e)))
    }

    fn access_token(&self) -> Option<String> {
        self.read_state()
            .session
            .as_ref()
            .filter(|s| !s.is_expired())
            .map(|s| s.access_token.clone())
    }
}
