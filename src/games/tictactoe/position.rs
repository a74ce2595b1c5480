//! Validated board positions.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// A position on the board, numbered 0-8 left-to-right, top-to-bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct Position(u8);

impl Position {
    /// Creates a position from a raw index.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] if the index falls outside the 3x3 board.
    pub fn new(index: u8) -> Result<Self, PositionError> {
        if index < 9 {
            Ok(Self(index))
        } else {
            Err(PositionError { index })
        }
    }

    /// Returns the raw index for board addressing.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Iterates over all nine positions.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..9).map(Position)
    }
}

impl TryFrom<u8> for Position {
    type Error = PositionError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

/// Error for positions outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("position {index} is outside the 3x3 board")]
pub struct PositionError {
    /// The rejected index.
    pub index: u8,
}
