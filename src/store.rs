//! In-memory session store with per-code linearization.

use crate::session::{GameSession, SessionCode, SessionError, SessionSnapshot};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, instrument};

/// Shared map from join code to session.
///
/// Each session sits behind its own mutex, so mutations against different
/// codes never contend and mutations against the same code are
/// linearized: of two concurrent submits for the same turn, exactly one
/// commits and the other re-validates against the committed state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionCode, Arc<Mutex<GameSession>>>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session store");
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Inserts a session if its code is free. Returns `false` on
    /// collision, leaving the existing session untouched.
    #[instrument(skip(self, session), fields(code = %session.code()))]
    pub fn try_insert(&self, session: GameSession) -> bool {
        let mut sessions = self.sessions.write().unwrap();
        if sessions.contains_key(session.code()) {
            debug!("Code collision");
            return false;
        }
        sessions.insert(session.code().to_string(), Arc::new(Mutex::new(session)));
        true
    }

    /// Whether a session with the given code exists.
    pub fn contains(&self, code: &str) -> bool {
        self.sessions.read().unwrap().contains_key(code)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }

    fn entry(&self, code: &str) -> Result<Arc<Mutex<GameSession>>, SessionError> {
        self.sessions
            .read()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    /// Reads the current snapshot of a session.
    #[instrument(skip(self))]
    pub fn snapshot(&self, code: &str) -> Result<SessionSnapshot, SessionError> {
        let entry = self.entry(code)?;
        let session = entry.lock().unwrap();
        Ok(session.snapshot())
    }

    /// Runs a mutation against the session under its per-code lock.
    ///
    /// The mutation executes on a working copy; only if it succeeds is
    /// the copy committed with a version bump and `updated_at` touch.
    /// Rejected mutations leave the stored session byte-identical, so the
    /// next poll reflects true state.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown code, otherwise whatever the mutation
    /// returns.
    #[instrument(skip(self, mutation))]
    pub fn update<F>(&self, code: &str, mutation: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnOnce(&mut GameSession) -> Result<(), SessionError>,
    {
        let entry = self.entry(code)?;
        let mut guard = entry.lock().unwrap();

        let mut working = guard.clone();
        mutation(&mut working)?;
        working.commit_mutation();

        let snapshot = working.snapshot();
        *guard = working;
        debug!(version = snapshot.version, "Mutation committed");
        Ok(snapshot)
    }

    /// Removes sessions whose last mutation is older than `ttl`.
    ///
    /// Collaborator-level cleanup: the core never deletes sessions on its
    /// own, the server binary drives this from a timer. Returns how many
    /// sessions were removed.
    #[instrument(skip(self))]
    pub fn sweep_expired(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|code, entry| {
            let keep = entry.lock().unwrap().updated_at() > cutoff;
            if !keep {
                debug!(code = %code, "Sweeping expired session");
            }
            keep
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Swept expired sessions");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;

    fn store_with_session(code: &str) -> SessionStore {
        let store = SessionStore::new();
        assert!(store.try_insert(GameSession::new(
            code.to_string(),
            "alice@example.com".to_string(),
        )));
        store
    }

    #[test]
    fn test_insert_detects_collision() {
        let store = store_with_session("ABC123");
        assert!(!store.try_insert(GameSession::new(
            "ABC123".to_string(),
            "bob@example.com".to_string(),
        )));
        assert_eq!(store.len(), 1);
        // The original creator survives.
        assert_eq!(
            store.snapshot("ABC123").unwrap().player1_email,
            "alice@example.com"
        );
    }

    #[test]
    fn test_snapshot_unknown_code() {
        let store = SessionStore::new();
        assert_eq!(store.snapshot("NOPE42"), Err(SessionError::NotFound));
    }

    #[test]
    fn test_update_commits_and_bumps_version() {
        let store = store_with_session("ABC123");
        let before = store.snapshot("ABC123").unwrap();

        let after = store
            .update("ABC123", |s| s.admit("bob@example.com"))
            .unwrap();
        assert_eq!(after.status, SessionStatus::Active);
        assert_eq!(after.version, before.version + 1);
    }

    #[test]
    fn test_rejected_update_leaves_state_unchanged() {
        let store = store_with_session("ABC123");
        let before = store.snapshot("ABC123").unwrap();

        let err = store.update("ABC123", |s| s.admit("alice@example.com"));
        assert_eq!(err, Err(SessionError::AlreadyFull));
        assert_eq!(store.snapshot("ABC123").unwrap(), before);
    }

    #[test]
    fn test_reads_idempotent_between_mutations() {
        let store = store_with_session("ABC123");
        let first = store.snapshot("ABC123").unwrap();
        let second = store.snapshot("ABC123").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sweep_removes_only_idle_sessions() {
        let store = store_with_session("OLD111");
        assert!(store.try_insert(GameSession::new(
            "NEW222".to_string(),
            "bob@example.com".to_string(),
        )));

        // Nothing is older than an hour yet.
        assert_eq!(store.sweep_expired(Duration::hours(1)), 0);
        assert_eq!(store.len(), 2);

        // With a zero TTL everything just written is already expired.
        assert_eq!(store.sweep_expired(Duration::zero()), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_updates_linearized() {
        let store = store_with_session("ABC123");
        store
            .update("ABC123", |s| s.admit("bob@example.com"))
            .unwrap();

        // Both threads race to play X's opening move at different cells;
        // exactly one commits, the loser observes the committed turn.
        let handles: Vec<_> = [0u8, 4u8]
            .into_iter()
            .map(|position| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.update("ABC123", move |s| s.submit("alice@example.com", position))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert_eq!(
            results.iter().filter(|r| **r == Err(SessionError::NotYourTurn)).count(),
            1
        );

        let snap = store.snapshot("ABC123").unwrap();
        assert_eq!(snap.move_history.len(), 1);
        assert_eq!(snap.current_turn, crate::games::tictactoe::Symbol::O);
    }
}
