//! Game state machine for fading tic-tac-toe.

use super::position::Position;
use super::rules::{Outcome, evaluate};
use super::types::{Board, Symbol};
use super::window::{Move, MoveWindow};
use derive_more::{Display, Error};
use tracing::{debug, instrument};

/// Errors that can occur when playing a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The game has already ended.
    #[display("Game is over")]
    GameOver,
    /// The symbol is not the one expected to move.
    #[display("Not your turn")]
    NotYourTurn,
    /// The position is currently occupied on the derived board.
    #[display("Position already occupied")]
    PositionOccupied,
}

/// One game of fading tic-tac-toe.
///
/// Holds the move window, the symbol expected next, and the outcome. The
/// board is never stored; it is derived from the window on demand. Turn
/// order alternates strictly X, O, X, ... starting with X.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    window: MoveWindow,
    to_move: Symbol,
    outcome: Outcome,
    next_sequence: u64,
}

impl Game {
    /// Creates a new game with X to move.
    pub fn new() -> Self {
        Self {
            window: MoveWindow::new(),
            to_move: Symbol::X,
            outcome: Outcome::InProgress,
            next_sequence: 1,
        }
    }

    /// Plays a move for the given symbol.
    ///
    /// Validates that the game is still running, that `symbol` is the one
    /// expected, and that the position is empty on the derived board. On
    /// success the move enters the window (evicting the oldest when the
    /// window overflows), the outcome is evaluated on the post-eviction
    /// board, and the turn flips.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] and leaves the game unchanged when any
    /// validation fails.
    #[instrument(skip(self), fields(symbol = %symbol, position = %position))]
    pub fn play(&mut self, symbol: Symbol, position: Position) -> Result<Move, MoveError> {
        if self.outcome != Outcome::InProgress {
            return Err(MoveError::GameOver);
        }
        if symbol != self.to_move {
            return Err(MoveError::NotYourTurn);
        }
        if !self.window.board().is_empty(position) {
            return Err(MoveError::PositionOccupied);
        }

        let mv = Move::new(position, symbol, self.next_sequence);
        self.next_sequence += 1;

        let evicted = self.window.push(mv);
        // A line only counts on the board as it stands after eviction; a
        // cell that fades in the same transaction cannot win.
        self.outcome = evaluate(&self.window.board());
        self.to_move = symbol.opponent();

        debug!(
            sequence = mv.sequence,
            evicted = ?evicted.map(|m| m.position),
            outcome = ?self.outcome,
            "Move accepted"
        );

        Ok(mv)
    }

    /// Derives the visible board from the move window.
    pub fn board(&self) -> Board {
        self.window.board()
    }

    /// Returns the symbol expected to move next.
    pub fn to_move(&self) -> Symbol {
        self.to_move
    }

    /// Returns the current outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Retained moves, oldest first.
    pub fn history(&self) -> Vec<Move> {
        self.window.to_vec()
    }

    /// Total number of accepted moves over the life of the game.
    pub fn moves_played(&self) -> u64 {
        self.next_sequence - 1
    }

    /// Position of the move that fades on the next accepted move, if the
    /// window is full.
    pub fn fading_position(&self) -> Option<Position> {
        self.window.fading_position()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::Square;
    use super::*;

    fn pos(index: u8) -> Position {
        Position::new(index).unwrap()
    }

    /// Plays out alternating moves, panicking on any rejection.
    fn play_all(game: &mut Game, positions: &[u8]) {
        for &index in positions {
            let symbol = game.to_move();
            game.play(symbol, pos(index)).expect("legal move");
        }
    }

    #[test]
    fn test_turns_alternate_from_x() {
        let mut game = Game::new();
        assert_eq!(game.to_move(), Symbol::X);

        game.play(Symbol::X, pos(0)).unwrap();
        assert_eq!(game.to_move(), Symbol::O);

        game.play(Symbol::O, pos(1)).unwrap();
        assert_eq!(game.to_move(), Symbol::X);
    }

    #[test]
    fn test_turn_matches_move_parity() {
        let mut game = Game::new();
        play_all(&mut game, &[0, 1, 4, 5, 2, 8, 7, 6]);

        let expected = if game.moves_played() % 2 == 0 {
            Symbol::X
        } else {
            Symbol::O
        };
        assert_eq!(game.to_move(), expected);
    }

    #[test]
    fn test_wrong_symbol_rejected() {
        let mut game = Game::new();
        assert_eq!(game.play(Symbol::O, pos(0)), Err(MoveError::NotYourTurn));

        game.play(Symbol::X, pos(0)).unwrap();
        assert_eq!(game.play(Symbol::X, pos(1)), Err(MoveError::NotYourTurn));
    }

    #[test]
    fn test_occupied_position_rejected() {
        let mut game = Game::new();
        game.play(Symbol::X, pos(4)).unwrap();
        assert_eq!(
            game.play(Symbol::O, pos(4)),
            Err(MoveError::PositionOccupied)
        );
        // Rejection leaves the turn unchanged.
        assert_eq!(game.to_move(), Symbol::O);
    }

    #[test]
    fn test_sequences_increase() {
        let mut game = Game::new();
        let first = game.play(Symbol::X, pos(0)).unwrap();
        let second = game.play(Symbol::O, pos(1)).unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
    }

    #[test]
    fn test_win_finishes_game() {
        let mut game = Game::new();
        // X takes the 0-4-8 diagonal before any mark fades.
        play_all(&mut game, &[0, 1, 4, 5, 8]);

        assert_eq!(game.outcome(), Outcome::Won(Symbol::X));
        assert_eq!(game.play(Symbol::O, pos(2)), Err(MoveError::GameOver));
    }

    #[test]
    fn test_seventh_move_evicts_oldest() {
        let mut game = Game::new();
        // Six moves fill the window with no line completed.
        play_all(&mut game, &[0, 1, 4, 5, 2, 6]);
        assert_eq!(game.fading_position(), Some(pos(0)));

        game.play(Symbol::X, pos(7)).unwrap();
        let board = game.board();
        assert_eq!(board.get(pos(0)), Square::Empty);
        assert_eq!(board.get(pos(7)), Square::Occupied(Symbol::X));
        assert_eq!(game.history().len(), 6);
    }

    #[test]
    fn test_win_evaluated_after_eviction() {
        let mut game = Game::new();
        // The seventh move puts X at 8, which would complete 0-4-8 --
        // but the same transaction evicts the X at 0, so the line is
        // broken and play continues.
        play_all(&mut game, &[0, 1, 4, 5, 2, 6]);
        game.play(Symbol::X, pos(8)).unwrap();

        assert_eq!(game.board().get(pos(0)), Square::Empty);
        assert_eq!(game.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_win_on_post_eviction_board() {
        let mut game = Game::new();
        // X's opening mark at 0 fades before the winning line forms; the
        // 2-4-6 diagonal stands entirely inside the live window.
        play_all(&mut game, &[0, 1, 6, 3, 4, 5]);
        assert_eq!(game.fading_position(), Some(pos(0)));

        game.play(Symbol::X, pos(2)).unwrap();
        assert_eq!(game.board().get(pos(0)), Square::Empty);
        assert_eq!(game.outcome(), Outcome::Won(Symbol::X));
        assert_eq!(game.play(Symbol::O, pos(0)), Err(MoveError::GameOver));
    }

    #[test]
    fn test_board_always_matches_history_replay() {
        let mut game = Game::new();
        play_all(&mut game, &[4, 0, 8, 2, 5, 6, 3]);

        let mut replayed = Board::new();
        for mv in game.history() {
            replayed.set(mv.position, Square::Occupied(mv.symbol));
        }
        assert_eq!(game.board(), replayed);
    }
}
