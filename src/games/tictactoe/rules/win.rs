//! Win detection logic.

use super::super::position::Position;
use super::super::types::{Board, Square, Symbol};
use tracing::instrument;

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
const LINES: [[u8; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(symbol)` if the symbol holds three in a row,
/// `None` otherwise.
#[instrument]
pub fn check_winner(board: &Board) -> Option<Symbol> {
    for line in LINES {
        let [a, b, c] = line.map(|index| {
            board.get(Position::new(index).expect("line indices are on the board"))
        });
        if a != Square::Empty && a == b && a == c {
            return match a {
                Square::Occupied(symbol) => Some(symbol),
                Square::Empty => None,
            };
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(index: u8) -> Position {
        Position::new(index).unwrap()
    }

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new();
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_winner_top_row() {
        let mut board = Board::new();
        board.set(pos(0), Square::Occupied(Symbol::X));
        board.set(pos(1), Square::Occupied(Symbol::X));
        board.set(pos(2), Square::Occupied(Symbol::X));
        assert_eq!(check_winner(&board), Some(Symbol::X));
    }

    #[test]
    fn test_winner_column() {
        let mut board = Board::new();
        board.set(pos(1), Square::Occupied(Symbol::O));
        board.set(pos(4), Square::Occupied(Symbol::O));
        board.set(pos(7), Square::Occupied(Symbol::O));
        assert_eq!(check_winner(&board), Some(Symbol::O));
    }

    #[test]
    fn test_winner_diagonal() {
        let mut board = Board::new();
        board.set(pos(0), Square::Occupied(Symbol::O));
        board.set(pos(4), Square::Occupied(Symbol::O));
        board.set(pos(8), Square::Occupied(Symbol::O));
        assert_eq!(check_winner(&board), Some(Symbol::O));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let mut board = Board::new();
        board.set(pos(0), Square::Occupied(Symbol::X));
        board.set(pos(1), Square::Occupied(Symbol::X));
        assert_eq!(check_winner(&board), None);
    }
}
