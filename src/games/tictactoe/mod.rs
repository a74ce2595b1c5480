//! Fading tic-tac-toe game logic.
//!
//! A variant of tic-tac-toe where only the most recent six accepted moves
//! stay on the board. Older marks fall off, so the board never fills and
//! the game stays contested until a line is completed.

mod game;
mod position;
mod rules;
mod types;
mod window;

pub use game::{Game, MoveError};
pub use position::{Position, PositionError};
pub use rules::{Outcome, check_winner, evaluate, is_full};
pub use types::{Board, Square, Symbol};
pub use window::{Move, MoveWindow, WINDOW_CAPACITY};
