use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chess_board::{ChessBoard, Color, Move};
use crate::chess_errors::{ChessError, ChessResult};

/// Ordered history of positions, index 0 being the initial one. Past
/// positions are never changed; playing a move appends a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    states: Vec<ChessBoard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    WhiteWon,
    BlackWon,
    Draw,
}

/// Why a game ended, listed in the order the conditions are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Checkmate,
    FiftyMoveRule,
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Termination::Checkmate => "checkmate",
            Termination::FiftyMoveRule => "fifty-move rule",
            Termination::Stalemate => "stalemate",
            Termination::ThreefoldRepetition => "threefold repetition",
            Termination::InsufficientMaterial => "insufficient material",
        };
        write!(f, "{}", reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub outcome: Outcome,
    pub reason: Termination,
}

impl GameResult {
    fn draw(reason: Termination) -> Self {
        Self {
            outcome: Outcome::Draw,
            reason,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.outcome {
            Outcome::WhiteWon => "White Won",
            Outcome::BlackWon => "Black Won",
            Outcome::Draw => "Draw",
        }
    }

    pub fn reason(&self) -> Termination {
        self.reason
    }

    pub fn white_score(&self) -> f32 {
        match self.outcome {
            Outcome::WhiteWon => 1.0,
            Outcome::BlackWon => 0.0,
            Outcome::Draw => 0.5,
        }
    }

    pub fn score_string(&self) -> String {
        format!("{} - {}", self.white_score(), 1.0 - self.white_score())
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.label(), self.reason)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(ChessBoard::starting_position())
    }

    pub fn from_position(board: ChessBoard) -> Self {
        Self { states: vec![board] }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn push(&mut self, board: ChessBoard) {
        self.states.push(board);
    }

    /// Removes and returns the latest position (undo).
    pub fn pop_last(&mut self) -> Option<ChessBoard> {
        self.states.pop()
    }

    pub fn current(&self) -> Option<&ChessBoard> {
        self.states.last()
    }

    pub fn history(&self) -> &[ChessBoard] {
        &self.states
    }

    /// Plays `mv` on the current position and returns its notation.
    pub fn play(&mut self, mv: Move) -> ChessResult<String> {
        let current = self
            .current()
            .ok_or_else(|| ChessError::InvalidMove("game has no position".to_string()))?;
        let applied = current.apply_move(mv)?;
        self.states.push(applied.board);
        Ok(applied.notation)
    }

    /// Parses `text` against the current position and plays it.
    pub fn play_notation(&mut self, text: &str) -> ChessResult<String> {
        let mv = self
            .current()
            .and_then(|board| board.parse_move(text))
            .ok_or_else(|| ChessError::InvalidMove(format!("cannot read move: {}", text)))?;
        self.play(mv)
    }

    /// The terminal result of the current position, `None` while the game
    /// goes on. Conditions are checked in a fixed order and the first one
    /// that holds wins.
    pub fn result(&self) -> Option<GameResult> {
        let board = self.current()?;
        if board.is_checkmate() {
            let outcome = match board.active_color() {
                Color::White => Outcome::BlackWon,
                Color::Black => Outcome::WhiteWon,
            };
            return Some(GameResult {
                outcome,
                reason: Termination::Checkmate,
            });
        }
        if board.is_fifty_move_rule() {
            return Some(GameResult::draw(Termination::FiftyMoveRule));
        }
        if board.is_stalemate() {
            return Some(GameResult::draw(Termination::Stalemate));
        }
        if self.is_threefold_repetition() {
            return Some(GameResult::draw(Termination::ThreefoldRepetition));
        }
        if board.insufficient_material() {
            return Some(GameResult::draw(Termination::InsufficientMaterial));
        }
        None
    }

    /// Counts the current position among itself and the previous
    /// `halfmove_clock` positions; three or more is a repetition.
    pub fn is_threefold_repetition(&self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        let window = current.halfmove_clock() as usize + 1;
        let key = current.zobrist_key();
        self.states
            .iter()
            .rev()
            .take(window)
            .filter(|state| state.zobrist_key() == key && state.same_position(current))
            .count()
            >= 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(game: &mut Game, moves: &[&str]) -> Vec<String> {
        moves.iter().map(|text| game.play_notation(text).unwrap()).collect()
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::new();
        let notation = play_all(&mut game, &["f2-f3", "e7-e5", "g2-g4", "d8-h4"]);
        assert_eq!(notation, vec!["f3", "e5", "g4", "Qh4#"]);

        let result = game.result().unwrap();
        assert_eq!(result.label(), "Black Won");
        assert_eq!(result.reason(), Termination::Checkmate);
        assert_eq!(result.reason().to_string(), "checkmate");
        assert_eq!(result.white_score(), 0.0);
        assert_eq!(result.score_string(), "0 - 1");
        assert_eq!(result.to_string(), "Black Won by checkmate");
    }

    #[test]
    fn test_history_push_and_pop() {
        let mut game = Game::new();
        assert_eq!(game.len(), 1);
        play_all(&mut game, &["e4", "e5"]);
        assert_eq!(game.len(), 3);
        assert_eq!(game.history()[0], ChessBoard::starting_position());

        let last = game.pop_last().unwrap();
        assert_eq!(last.active_color(), Color::White);
        assert_eq!(game.len(), 2);
        assert_eq!(game.current().unwrap().active_color(), Color::Black);

        game.push(last.clone());
        assert_eq!(game.current(), Some(&last));
    }

    #[test]
    fn test_empty_game() {
        let mut game = Game::new();
        assert!(game.pop_last().is_some());
        assert!(game.is_empty());
        assert_eq!(game.current(), None);
        assert_eq!(game.result(), None);
        assert!(!game.is_threefold_repetition());
        assert!(matches!(game.play_notation("e4"), Err(ChessError::InvalidMove(_))));
    }

    #[test]
    fn test_illegal_move_keeps_history() {
        let mut game = Game::new();
        assert!(matches!(game.play_notation("e5"), Err(ChessError::InvalidMove(_))));
        assert!(game
            .play(Move::basic(
                "e2".parse().unwrap(),
                "e5".parse().unwrap()
            ))
            .is_err());
        assert_eq!(game.len(), 1);
        assert_eq!(game.result(), None);
    }

    #[test]
    fn test_threefold_repetition_on_third_occurrence() {
        let mut game = Game::new();
        let moves = ["Nf3", "Nf6", "Ng1", "Ng8", "Nc3", "Nc6", "Nb1", "Nb8"];
        for (ply, text) in moves.iter().enumerate() {
            assert_eq!(game.result(), None, "game over before ply {}", ply + 1);
            game.play_notation(text).unwrap();
        }
        assert!(game.is_threefold_repetition());
        let result = game.result().unwrap();
        assert_eq!(result.reason(), Termination::ThreefoldRepetition);
        assert_eq!(result.label(), "Draw");
        assert_eq!(result.score_string(), "0.5 - 0.5");
    }

    #[test]
    fn test_repetition_window_bounded_by_halfmove_clock() {
        let board = ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 1 1").unwrap();
        let mut game = Game::from_position(board.clone());
        game.push(board.clone());
        game.push(board);
        // only the last two positions are inside the window
        assert!(!game.is_threefold_repetition());

        game.push(ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 2 1").unwrap());
        assert!(game.is_threefold_repetition());
    }

    #[test]
    fn test_fifty_move_rule_before_stalemate() {
        let game = Game::from_position(ChessBoard::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 50 80").unwrap());
        assert_eq!(game.result().unwrap().reason(), Termination::FiftyMoveRule);

        let game = Game::from_position(ChessBoard::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 80").unwrap());
        let result = game.result().unwrap();
        assert_eq!(result.reason(), Termination::Stalemate);
        assert_eq!(result.white_score(), 0.5);
    }

    #[test]
    fn test_checkmate_before_fifty_move_rule() {
        let game = Game::from_position(ChessBoard::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 60 80").unwrap());
        let result = game.result().unwrap();
        assert_eq!(result.reason(), Termination::Checkmate);
        assert_eq!(result.label(), "White Won");
        assert_eq!(result.score_string(), "1 - 0");
    }

    #[test]
    fn test_insufficient_material_result() {
        let game = Game::from_position(ChessBoard::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap());
        assert_eq!(game.result().unwrap().reason(), Termination::InsufficientMaterial);
        let game = Game::from_position(ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap());
        assert_eq!(game.result(), None);
    }

    #[test]
    fn test_single_check_notation() {
        let mut game = Game::new();
        let notation = play_all(&mut game, &["e4", "f5", "Qh5+"]);
        assert_eq!(notation[2], "Qh5+");
        assert_eq!(game.result(), None);
    }

    #[test]
    fn test_game_serializes() {
        let mut game = Game::new();
        play_all(&mut game, &["d4", "d5", "c4"]);
        let json = serde_json::to_string(&game).unwrap();
        let restored: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, game);
        assert_eq!(restored.current().unwrap().to_fen(), game.current().unwrap().to_fen());
    }
}
