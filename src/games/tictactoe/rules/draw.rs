//! Full-board detection.

use super::super::types::{Board, Square};
use tracing::instrument;

/// Checks if the board is full (all squares occupied).
///
/// A full board with no winner is a draw. With the move window capped at
/// six, legal play never fills the board, so this only fires on boards
/// built outside the window engine.
#[instrument]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

#[cfg(test)]
mod tests {
    use super::super::super::position::Position;
    use super::super::super::types::Symbol;
    use super::super::win::check_winner;
    use super::*;

    fn pos(index: u8) -> Position {
        Position::new(index).unwrap()
    }

    fn is_draw(board: &Board) -> bool {
        is_full(board) && check_winner(board).is_none()
    }

    #[test]
    fn test_empty_board_not_full() {
        let board = Board::new();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.set(pos(4), Square::Occupied(Symbol::X));
        assert!(!is_full(&board));
    }

    #[test]
    fn test_draw_detection() {
        let mut board = Board::new();
        // X O X / O X X / O X O
        let cells = [
            Symbol::X,
            Symbol::O,
            Symbol::X,
            Symbol::O,
            Symbol::X,
            Symbol::X,
            Symbol::O,
            Symbol::X,
            Symbol::O,
        ];
        for (index, symbol) in cells.into_iter().enumerate() {
            board.set(pos(index as u8), Square::Occupied(symbol));
        }

        assert!(is_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let mut board = Board::new();
        board.set(pos(0), Square::Occupied(Symbol::X));
        board.set(pos(1), Square::Occupied(Symbol::X));
        board.set(pos(2), Square::Occupied(Symbol::X));

        assert!(!is_draw(&board));
    }
}
