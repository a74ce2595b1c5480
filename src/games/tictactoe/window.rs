//! Bounded move history and board projection.

use super::position::Position;
use super::types::{Board, Square, Symbol};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// Maximum number of moves retained on the board.
///
/// Once the window is full, each accepted move evicts the oldest one and
/// its mark disappears from the board. In steady state each symbol holds
/// at most three cells.
pub const WINDOW_CAPACITY: usize = 6;

/// An accepted move.
///
/// Immutable once accepted; `sequence` is server-assigned and strictly
/// increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Move {
    /// Board position the move was played at.
    pub position: Position,
    /// Symbol that played the move.
    pub symbol: Symbol,
    /// Server-assigned ordering number.
    pub sequence: u64,
}

/// Ring buffer of the most recent accepted moves.
///
/// The visible board is always a pure function of this window: replaying
/// the retained moves oldest-to-newest onto an empty board. Positions are
/// unique within the window because a move can only land on a cell that is
/// currently empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveWindow {
    moves: VecDeque<Move>,
}

impl MoveWindow {
    /// Creates an empty window.
    pub fn new() -> Self {
        Self {
            moves: VecDeque::with_capacity(WINDOW_CAPACITY + 1),
        }
    }

    /// Appends an accepted move, evicting the oldest if the window
    /// overflows. Returns the evicted move, if any.
    #[instrument(skip(self), fields(position = %mv.position, symbol = %mv.symbol))]
    pub fn push(&mut self, mv: Move) -> Option<Move> {
        self.moves.push_back(mv);
        if self.moves.len() > WINDOW_CAPACITY {
            let evicted = self.moves.pop_front();
            if let Some(old) = &evicted {
                debug!(position = %old.position, symbol = %old.symbol, "Evicted oldest move");
            }
            evicted
        } else {
            None
        }
    }

    /// Derives the visible board by replaying the retained window.
    pub fn board(&self) -> Board {
        let mut board = Board::new();
        for mv in &self.moves {
            board.set(mv.position, Square::Occupied(mv.symbol));
        }
        board
    }

    /// Position of the oldest retained move, exposed only when the window
    /// is exactly full. Clients highlight this cell as the next to fade.
    pub fn fading_position(&self) -> Option<Position> {
        if self.moves.len() == WINDOW_CAPACITY {
            self.moves.front().map(|mv| mv.position)
        } else {
            None
        }
    }

    /// Number of retained moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether the window holds no moves.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Retained moves, oldest first.
    pub fn to_vec(&self) -> Vec<Move> {
        self.moves.iter().copied().collect()
    }
}
