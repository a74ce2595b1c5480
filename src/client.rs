//! Typed HTTP client with polling reconciliation.
//!
//! The protocol is purely pull-based: after any action the client keeps
//! polling the session snapshot on a fixed interval and reconciles its
//! local view with whatever the server returns. Staleness up to one
//! polling interval is expected, not an error.

use crate::server::{AuthResponse, CreateGameRequest, CredentialsRequest, JoinGameRequest, MoveRequest};
use crate::session::{SessionSnapshot, SessionStatus};
use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// HTTP client for the game API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.context("Malformed response body");
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("unknown error")
            .to_string();
        bail!("Request failed ({}): {}", status, message)
    }

    /// Creates an account; returns the email identifier.
    #[instrument(skip(self, password))]
    pub async fn signup(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/signup", self.base_url))
            .json(&CredentialsRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .context("Signup request failed")?;
        let auth: AuthResponse = Self::decode(response).await?;
        info!(email = %auth.email, "Signed up");
        Ok(auth.email)
    }

    /// Verifies credentials; returns the email identifier.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/login", self.base_url))
            .json(&CredentialsRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .context("Login request failed")?;
        let auth: AuthResponse = Self::decode(response).await?;
        Ok(auth.email)
    }

    /// Creates a session and returns its first snapshot.
    #[instrument(skip(self))]
    pub async fn create_game(&self, email: &str) -> Result<SessionSnapshot> {
        let response = self
            .client
            .post(format!("{}/api/game/create", self.base_url))
            .json(&CreateGameRequest {
                email: email.to_string(),
            })
            .send()
            .await
            .context("Create request failed")?;
        let snapshot: SessionSnapshot = Self::decode(response).await?;
        info!(code = %snapshot.code, "Created game");
        Ok(snapshot)
    }

    /// Joins a session by code.
    #[instrument(skip(self))]
    pub async fn join_game(&self, code: &str, email: &str) -> Result<SessionSnapshot> {
        let response = self
            .client
            .post(format!("{}/api/game/join", self.base_url))
            .json(&JoinGameRequest {
                code: code.to_string(),
                email: email.to_string(),
            })
            .send()
            .await
            .context("Join request failed")?;
        Self::decode(response).await
    }

    /// Submits a move.
    #[instrument(skip(self))]
    pub async fn submit_move(&self, code: &str, email: &str, position: u8) -> Result<SessionSnapshot> {
        let response = self
            .client
            .post(format!("{}/api/game/move", self.base_url))
            .json(&MoveRequest {
                code: code.to_string(),
                email: email.to_string(),
                position,
            })
            .send()
            .await
            .context("Move request failed")?;
        Self::decode(response).await
    }

    /// Polls the current snapshot once.
    #[instrument(skip(self))]
    pub async fn get_game(&self, code: &str) -> Result<SessionSnapshot> {
        let response = self
            .client
            .get(format!("{}/api/game/{}", self.base_url, code))
            .send()
            .await
            .context("Poll request failed")?;
        Self::decode(response).await
    }

    /// Polls until the session version advances past `after_version` or
    /// the session finishes, then returns the fresh snapshot.
    ///
    /// Transient poll failures are logged and retried on the next tick;
    /// the loop only fails once polling itself keeps erroring.
    #[instrument(skip(self))]
    pub async fn wait_for_update(
        &self,
        code: &str,
        after_version: u64,
        interval: Duration,
    ) -> Result<SessionSnapshot> {
        let mut failures = 0u32;
        loop {
            match self.get_game(code).await {
                Ok(snapshot) => {
                    failures = 0;
                    if snapshot.version > after_version
                        || snapshot.status == SessionStatus::Finished
                    {
                        debug!(version = snapshot.version, "Snapshot advanced");
                        return Ok(snapshot);
                    }
                }
                Err(e) => {
                    failures += 1;
                    debug!(error = %e, failures, "Poll failed, will retry");
                    if failures >= 5 {
                        return Err(e).context("Polling failed repeatedly");
                    }
                }
            }
            tokio::time::sleep(interval).await;
        }
    }
}
