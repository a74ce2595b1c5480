//! Session lifecycle operations.

use crate::session::{GameSession, SessionError, SessionSnapshot};
use crate::store::SessionStore;
use rand::Rng;
use tracing::{info, instrument, warn};

/// Characters used in join codes, matching what players can type easily.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a join code.
const CODE_LENGTH: usize = 6;

/// Collision retries before create gives up with `CodesExhausted`.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Samples a fresh join code.
fn generate_code<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Creates, joins, and arbitrates game sessions.
///
/// The manager is the only writer to the store; every mutation runs under
/// the store's per-code lock, so concurrent joins and moves against the
/// same session are linearized.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    store: SessionStore,
}

impl SessionManager {
    /// Creates a manager with a fresh store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self {
            store: SessionStore::new(),
        }
    }

    /// Creates a manager over an existing store.
    pub fn with_store(store: SessionStore) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Creates a session for `creator` under a fresh join code.
    ///
    /// Codes are sampled until one misses the store; insertion itself is
    /// the collision check, so two racing creates can never share a code.
    ///
    /// # Errors
    ///
    /// Returns `CodesExhausted` if no free code turns up within the retry
    /// budget.
    #[instrument(skip(self, creator))]
    pub fn create_session(&self, creator: &str) -> Result<SessionSnapshot, SessionError> {
        let mut rng = rand::rng();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(&mut rng);
            let session = GameSession::new(code.clone(), creator.to_string());
            let snapshot = session.snapshot();
            if self.store.try_insert(session) {
                info!(code = %code, "Created new session");
                return Ok(snapshot);
            }
        }

        warn!("Exhausted code allocation attempts");
        Err(SessionError::CodesExhausted)
    }

    /// Admits `joiner` into the session with the given code.
    #[instrument(skip(self, joiner))]
    pub fn join_session(&self, code: &str, joiner: &str) -> Result<SessionSnapshot, SessionError> {
        self.store.update(code, |session| session.admit(joiner))
    }

    /// Validates and applies a move.
    #[instrument(skip(self, requester))]
    pub fn submit_move(
        &self,
        code: &str,
        requester: &str,
        position: u8,
    ) -> Result<SessionSnapshot, SessionError> {
        self.store
            .update(code, |session| session.submit(requester, position))
    }

    /// Reads the current snapshot without mutating.
    ///
    /// This is the poll operation of the sync protocol: clients call it
    /// on a fixed interval and reconcile their local view with the
    /// returned snapshot. Staleness is bounded by the polling interval.
    #[instrument(skip(self))]
    pub fn get_session(&self, code: &str) -> Result<SessionSnapshot, SessionError> {
        self.store.snapshot(code)
    }
}
