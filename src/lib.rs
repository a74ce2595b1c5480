//! Gridfade - fading tic-tac-toe session server
//!
//! Two players join a shared session through a short join code and play a
//! tic-tac-toe variant where only the six most recent moves stay on the
//! board. The server is the sole arbiter of state; clients reconcile by
//! polling full session snapshots.
//!
//! # Architecture
//!
//! - **Games**: the move window, board projection, and win evaluation
//! - **Session**: one two-player session and its error taxonomy
//! - **Store**: in-memory session registry with per-code linearization
//! - **Manager**: create/join/move/poll lifecycle operations
//! - **Server**: axum HTTP surface over the manager
//! - **Client**: typed polling client
//! - **Directory**: opaque auth collaborator keyed by email
//!
//! # Example
//!
//! ```
//! use gridfade::SessionManager;
//!
//! # fn example() -> Result<(), gridfade::SessionError> {
//! let sessions = SessionManager::new();
//! let created = sessions.create_session("alice@example.com")?;
//! let joined = sessions.join_session(&created.code, "bob@example.com")?;
//! let after_move = sessions.submit_move(&created.code, "alice@example.com", 4)?;
//! assert!(after_move.version > joined.version);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod config;
mod directory;
mod games;
mod manager;
mod server;
mod session;
mod store;

// Crate-level exports - HTTP client
pub use client::{ApiClient, DEFAULT_POLL_INTERVAL};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Auth collaborator
pub use directory::{DirectoryError, MemoryDirectory, UserDirectory};

// Crate-level exports - Session lifecycle
pub use manager::SessionManager;

// Crate-level exports - HTTP server
pub use server::{
    ApiError, AppState, AuthResponse, CreateGameRequest, CredentialsRequest, JoinGameRequest,
    MoveRequest, router, serve,
};

// Crate-level exports - Session types
pub use session::{
    GameSession, SessionCode, SessionError, SessionSnapshot, SessionStatus, Winner,
};

// Crate-level exports - Session store
pub use store::SessionStore;

// Crate-level exports - Game types
pub use games::tictactoe::{
    Board, Game, Move, MoveError, MoveWindow, Outcome, Position, PositionError, Square, Symbol,
    WINDOW_CAPACITY, check_winner, evaluate, is_full,
};
