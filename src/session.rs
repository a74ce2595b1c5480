//! Game sessions joined by code.

use crate::games::tictactoe::{Game, Move, Outcome, Position, Symbol};
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Join code identifying a session.
pub type SessionCode = String;

/// Status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created; waiting for a second player.
    Waiting,
    /// Both players present; game running.
    Active,
    /// Game over; no further moves accepted.
    Finished,
}

/// Final result of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// X completed a line.
    X,
    /// O completed a line.
    O,
    /// Neither side can win. Unreachable through window-bounded play.
    #[serde(rename = "draw")]
    Draw,
}

impl From<Symbol> for Winner {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => Winner::X,
            Symbol::O => Winner::O,
        }
    }
}

/// Errors returned by session operations.
///
/// Every error is terminal for its single request and leaves the session
/// unchanged; the caller decides whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// No session with the given code.
    #[display("Game not found")]
    NotFound,
    /// The session already has two players, or the joiner created it.
    #[display("Game is full")]
    AlreadyFull,
    /// The requester's symbol is not the one expected to move.
    #[display("Not your turn")]
    NotYourTurn,
    /// The session is finished.
    #[display("Game is over")]
    GameOver,
    /// Position out of range or currently occupied.
    #[display("Position invalid or already occupied")]
    InvalidPosition,
    /// The requester is neither player.
    #[display("Not a player in this game")]
    NotAPlayer,
    /// Code allocation gave up after too many collisions.
    #[display("Could not allocate a unique game code")]
    CodesExhausted,
}

/// One two-player session.
///
/// Mutated only through [`crate::SessionManager`], which routes every
/// mutation through the store's per-code lock. `player1` plays X and is
/// set at creation; `player2` plays O and is set at most once, at
/// admission.
#[derive(Debug, Clone)]
pub struct GameSession {
    code: SessionCode,
    player1: String,
    player2: Option<String>,
    game: Game,
    status: SessionStatus,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GameSession {
    /// Creates a new session in `waiting` with an empty history.
    #[instrument(skip_all, fields(code = %code, player1 = %creator))]
    pub fn new(code: SessionCode, creator: String) -> Self {
        info!("Creating new game session");
        let now = Utc::now();
        Self {
            code,
            player1: creator,
            player2: None,
            game: Game::new(),
            status: SessionStatus::Waiting,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the join code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the symbol a player identifier maps to, if any.
    pub fn symbol_of(&self, player: &str) -> Option<Symbol> {
        if player == self.player1 {
            Some(Symbol::X)
        } else if self.player2.as_deref() == Some(player) {
            Some(Symbol::O)
        } else {
            None
        }
    }

    /// Admits a second player and activates the session.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyFull` if a second player is already present or the
    /// joiner created the session.
    #[instrument(skip(self, joiner), fields(code = %self.code, joiner = %joiner))]
    pub fn admit(&mut self, joiner: &str) -> Result<(), SessionError> {
        if self.player2.is_some() || joiner == self.player1 {
            warn!("Session already has 2 players");
            return Err(SessionError::AlreadyFull);
        }

        self.player2 = Some(joiner.to_string());
        self.status = SessionStatus::Active;
        info!("Player admitted, session active");
        Ok(())
    }

    /// Validates and applies a move from the given requester.
    ///
    /// The requester must be one of the two players, the session must not
    /// be finished, the requester's symbol must match the current turn,
    /// and the position must be a free cell. A session still `waiting`
    /// accepts opening moves from player1; player2 does not exist yet, so
    /// only X can move before admission.
    ///
    /// # Errors
    ///
    /// Returns the matching [`SessionError`] and leaves the session
    /// unchanged when any validation fails.
    #[instrument(skip(self, requester), fields(code = %self.code))]
    pub fn submit(&mut self, requester: &str, position: u8) -> Result<(), SessionError> {
        let symbol = self.symbol_of(requester).ok_or_else(|| {
            warn!("Unknown player attempted move");
            SessionError::NotAPlayer
        })?;
        let position = Position::new(position).map_err(|e| {
            warn!(error = %e, "Position out of range");
            SessionError::InvalidPosition
        })?;

        self.game.play(symbol, position).map_err(|e| {
            warn!(symbol = %symbol, error = %e, "Move rejected");
            SessionError::from(e)
        })?;

        if self.game.outcome() != Outcome::InProgress {
            self.status = SessionStatus::Finished;
        }

        info!(
            symbol = %symbol,
            moves = self.game.moves_played(),
            status = ?self.status,
            "Move completed successfully"
        );
        Ok(())
    }

    /// Winner of a finished session, if any.
    pub fn winner(&self) -> Option<Winner> {
        match self.game.outcome() {
            Outcome::InProgress => None,
            Outcome::Won(symbol) => Some(Winner::from(symbol)),
            Outcome::Draw => Some(Winner::Draw),
        }
    }

    /// Marks the session mutated: bumps the version and touches
    /// `updated_at`. Called by the store when committing an update.
    pub(crate) fn commit_mutation(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Time of the last committed mutation.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Builds the externally-visible snapshot of this session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            code: self.code.clone(),
            player1_email: self.player1.clone(),
            player2_email: self.player2.clone(),
            board: self.game.board().cells(),
            move_history: self.game.history(),
            current_turn: self.game.to_move(),
            status: self.status,
            winner: self.winner(),
            fading_position: self.game.fading_position(),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Externally-visible state of a session at a point in time.
///
/// Returned by reads and mutations alike; the payload is small and fixed
/// size (9 cells plus at most 6 moves), so polling clients always receive
/// the full snapshot rather than deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Join code.
    pub code: SessionCode,
    /// Creator; plays X.
    pub player1_email: String,
    /// Joiner; plays O. Absent while `waiting`.
    pub player2_email: Option<String>,
    /// Derived board, row-major.
    pub board: [Option<Symbol>; 9],
    /// Retained move window, oldest first.
    pub move_history: Vec<Move>,
    /// Symbol expected to move next.
    pub current_turn: Symbol,
    /// Session status.
    pub status: SessionStatus,
    /// Winner, set only when finished.
    pub winner: Option<Winner>,
    /// Cell whose mark fades on the next accepted move, when the window
    /// is full.
    pub fading_position: Option<Position>,
    /// Bumps on every accepted mutation; lets clients detect staleness.
    pub version: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl From<crate::games::tictactoe::MoveError> for SessionError {
    fn from(err: crate::games::tictactoe::MoveError) -> Self {
        use crate::games::tictactoe::MoveError;
        match err {
            MoveError::GameOver => SessionError::GameOver,
            MoveError::NotYourTurn => SessionError::NotYourTurn,
            MoveError::PositionOccupied => SessionError::InvalidPosition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new("ABC123".to_string(), "alice@example.com".to_string())
    }

    #[test]
    fn test_new_session_waiting() {
        let s = session();
        assert_eq!(s.status(), SessionStatus::Waiting);
        assert_eq!(s.symbol_of("alice@example.com"), Some(Symbol::X));
        assert_eq!(s.symbol_of("bob@example.com"), None);
        assert!(s.snapshot().move_history.is_empty());
    }

    #[test]
    fn test_admit_activates() {
        let mut s = session();
        s.admit("bob@example.com").unwrap();
        assert_eq!(s.status(), SessionStatus::Active);
        assert_eq!(s.symbol_of("bob@example.com"), Some(Symbol::O));
    }

    #[test]
    fn test_admit_rejects_creator() {
        let mut s = session();
        assert_eq!(s.admit("alice@example.com"), Err(SessionError::AlreadyFull));
    }

    #[test]
    fn test_admit_rejects_third_player() {
        let mut s = session();
        s.admit("bob@example.com").unwrap();
        assert_eq!(s.admit("carol@example.com"), Err(SessionError::AlreadyFull));
    }

    #[test]
    fn test_creator_may_open_while_waiting() {
        let mut s = session();
        s.submit("alice@example.com", 0).unwrap();
        assert_eq!(s.snapshot().board[0], Some(Symbol::X));
        assert_eq!(s.status(), SessionStatus::Waiting);
    }

    #[test]
    fn test_submit_error_taxonomy() {
        let mut s = session();
        s.admit("bob@example.com").unwrap();

        assert_eq!(
            s.submit("carol@example.com", 0),
            Err(SessionError::NotAPlayer)
        );
        assert_eq!(
            s.submit("bob@example.com", 0),
            Err(SessionError::NotYourTurn)
        );
        assert_eq!(
            s.submit("alice@example.com", 9),
            Err(SessionError::InvalidPosition)
        );

        s.submit("alice@example.com", 0).unwrap();
        assert_eq!(
            s.submit("bob@example.com", 0),
            Err(SessionError::InvalidPosition)
        );
    }

    #[test]
    fn test_win_finishes_session() {
        let mut s = session();
        s.admit("bob@example.com").unwrap();

        // X takes 0-4-8 before any mark fades.
        for (player, position) in [
            ("alice@example.com", 0),
            ("bob@example.com", 1),
            ("alice@example.com", 4),
            ("bob@example.com", 5),
            ("alice@example.com", 8),
        ] {
            s.submit(player, position).unwrap();
        }

        assert_eq!(s.status(), SessionStatus::Finished);
        assert_eq!(s.winner(), Some(Winner::X));
        assert_eq!(
            s.submit("bob@example.com", 2),
            Err(SessionError::GameOver)
        );
    }

    #[test]
    fn test_winner_wire_form() {
        assert_eq!(serde_json::to_string(&Winner::X).unwrap(), "\"X\"");
        assert_eq!(serde_json::to_string(&Winner::Draw).unwrap(), "\"draw\"");
        assert_eq!(
            serde_json::to_string(&SessionStatus::Waiting).unwrap(),
            "\"waiting\""
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut s = session();
        s.admit("bob@example.com").unwrap();
        s.submit("alice@example.com", 4).unwrap();

        let snap = s.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snap);
        assert_eq!(parsed.board[4], Some(Symbol::X));
        assert_eq!(parsed.current_turn, Symbol::O);
    }
}
