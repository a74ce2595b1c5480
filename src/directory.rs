//! User directory collaborator.
//!
//! Credential storage sits outside the game core: sessions only ever see
//! opaque email identifiers. The trait keeps the directory swappable for
//! a durable implementation; the in-memory one backs the server binary
//! and tests.

use async_trait::async_trait;
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{info, instrument, warn};

/// Errors from the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum DirectoryError {
    /// An account with this email already exists.
    #[display("User already exists")]
    AlreadyExists,
    /// Unknown email or wrong password.
    #[display("Invalid credentials")]
    InvalidCredentials,
}

/// Opaque account store keyed by email.
///
/// Success returns the email identifier; no session tokens are modeled.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Creates an account.
    async fn create_account(&self, email: &str, password: &str) -> Result<String, DirectoryError>;

    /// Verifies credentials.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, DirectoryError>;
}

/// In-memory directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    accounts: RwLock<HashMap<String, String>>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn create_account(&self, email: &str, password: &str) -> Result<String, DirectoryError> {
        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(email) {
            warn!("Account already exists");
            return Err(DirectoryError::AlreadyExists);
        }
        accounts.insert(email.to_string(), password.to_string());
        info!("Account created");
        Ok(email.to_string())
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, DirectoryError> {
        let accounts = self.accounts.read().unwrap();
        match accounts.get(email) {
            Some(stored) if stored == password => Ok(email.to_string()),
            _ => {
                warn!("Credential verification failed");
                Err(DirectoryError::InvalidCredentials)
            }
        }
    }
}
