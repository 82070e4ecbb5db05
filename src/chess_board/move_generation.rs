use super::{ChessBoard, ChessField, Move, Piece, PieceType};

const KNIGHT_MOVES: [(i8, i8); 8] = [(-2, -1), (-1, -2), (1, -2), (2, -1), (2, 1), (1, 2), (-1, 2), (-2, 1)];
const KING_MOVES: [(i8, i8); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [(-1, -1), (-1, 1), (1, -1), (1, 1), (0, -1), (0, 1), (-1, 0), (1, 0)];

fn delta(start: ChessField, target: ChessField) -> (i8, i8) {
    (
        target.row() as i8 - start.row() as i8,
        target.col() as i8 - start.col() as i8,
    )
}

/// True if every field strictly between `start` and `target` is empty.
/// Only meaningful for fields on a common line.
fn path_clear(board: &ChessBoard, start: ChessField, target: ChessField) -> bool {
    let (dr, dc) = delta(start, target);
    let step = (dr.signum(), dc.signum());
    let mut current = start;
    while let Some(next) = current.offset(step.0, step.1) {
        if next == target {
            return true;
        }
        if board.piece_at(next).is_some() {
            return false;
        }
        current = next;
    }
    false
}

fn rook_line(board: &ChessBoard, start: ChessField, target: ChessField) -> bool {
    let (dr, dc) = delta(start, target);
    ((dr == 0) != (dc == 0)) && path_clear(board, start, target)
}

fn bishop_line(board: &ChessBoard, start: ChessField, target: ChessField) -> bool {
    let (dr, dc) = delta(start, target);
    dr != 0 && dr.abs() == dc.abs() && path_clear(board, start, target)
}

impl Piece {
    /// Whether this piece standing on `start` threatens `target`. Ignores
    /// whose turn it is and what stands on `target`.
    pub fn can_attack(&self, board: &ChessBoard, start: ChessField, target: ChessField) -> bool {
        let (dr, dc) = delta(start, target);
        match self.kind {
            PieceType::King => dr.abs() <= 1 && dc.abs() <= 1 && (dr, dc) != (0, 0),
            PieceType::Queen => rook_line(board, start, target) || bishop_line(board, start, target),
            PieceType::Rook => rook_line(board, start, target),
            PieceType::Bishop => bishop_line(board, start, target),
            PieceType::Knight => (dr.abs(), dc.abs()) == (1, 2) || (dr.abs(), dc.abs()) == (2, 1),
            PieceType::Pawn => dr == self.color.pawn_direction() && dc.abs() == 1,
        }
    }

    /// Validates `mv` against this piece's movement rules. Does not look at
    /// whether the mover's own king ends up in check.
    pub fn can_move(&self, board: &ChessBoard, mv: Move) -> bool {
        let target_free = |to: ChessField| board.piece_at(to).map_or(true, |p| p.color != self.color);
        match (self.kind, mv) {
            (PieceType::King, Move::KingsideCastle(color)) => color == self.color && board.can_castle_kingside(color),
            (PieceType::King, Move::QueensideCastle(color)) => color == self.color && board.can_castle_queenside(color),
            (PieceType::Pawn, Move::Basic { from, to }) => {
                to.row() != self.color.promotion_rank() && self.pawn_can_reach(board, from, to)
            }
            (PieceType::Pawn, Move::Promotion { from, to, promotion }) => {
                to.row() == self.color.promotion_rank()
                    && PieceType::PROMOTIONS.contains(&promotion)
                    && self.pawn_can_reach(board, from, to)
            }
            (PieceType::Pawn, Move::EnPassant { from, to }) => {
                let (dr, dc) = delta(from, to);
                let behind = ChessField::new_unchecked(from.row(), to.col());
                dr == self.color.pawn_direction()
                    && dc.abs() == 1
                    && board.en_passant() == Some(to)
                    && board.piece_at(to).is_none()
                    && board
                        .piece_at(behind)
                        .map_or(false, |p| p.kind == PieceType::Pawn && p.color != self.color)
            }
            (PieceType::Pawn, _) => false,
            (_, Move::Basic { from, to }) => target_free(to) && self.can_attack(board, from, to),
            _ => false,
        }
    }

    /// Single and double pushes onto empty fields, diagonal steps onto
    /// opponent pieces.
    fn pawn_can_reach(&self, board: &ChessBoard, from: ChessField, to: ChessField) -> bool {
        let (dr, dc) = delta(from, to);
        let forward = self.color.pawn_direction();
        match (dr, dc.abs()) {
            (r, 0) if r == forward => board.piece_at(to).is_none(),
            (r, 0) if r == 2 * forward => {
                !self.has_moved
                    && from.row() == self.color.pawn_rank()
                    && board.piece_at(to).is_none()
                    && from.offset(forward, 0).map_or(false, |mid| board.piece_at(mid).is_none())
            }
            (r, 1) if r == forward => board.piece_at(to).map_or(false, |p| p.color != self.color),
            _ => false,
        }
    }

    /// Pseudo-legal moves of this piece from `start`.
    pub fn potential_moves(&self, board: &ChessBoard, start: ChessField) -> Vec<Move> {
        match self.kind {
            PieceType::Pawn => self.generate_pawn_moves(board, start),
            PieceType::Knight => self.generate_moves_from_directions(board, start, &KNIGHT_MOVES),
            PieceType::Bishop => self.generate_sliding_moves(board, start, &BISHOP_DIRECTIONS),
            PieceType::Rook => self.generate_sliding_moves(board, start, &ROOK_DIRECTIONS),
            PieceType::Queen => self.generate_sliding_moves(board, start, &QUEEN_DIRECTIONS),
            PieceType::King => self.generate_king_moves(board, start),
        }
    }

    /// Moves from `start` that leave the mover's king safe.
    pub fn legal_moves(&self, board: &ChessBoard, start: ChessField) -> Vec<Move> {
        self.potential_moves(board, start)
            .into_iter()
            .filter(|mv| board.make_move(*mv).is_ok())
            .collect()
    }

    fn generate_pawn_moves(&self, board: &ChessBoard, start: ChessField) -> Vec<Move> {
        let mut moves = Vec::new();
        let forward = self.color.pawn_direction();

        if let Some(one) = start.offset(forward, 0) {
            if board.piece_at(one).is_none() {
                self.add_pawn_moves_with_and_without_promotion(start, one, &mut moves);

                if let Some(two) = start.offset(2 * forward, 0) {
                    if !self.has_moved && start.row() == self.color.pawn_rank() && board.piece_at(two).is_none() {
                        moves.push(Move::basic(start, two));
                    }
                }
            }
        }

        for dc in [-1, 1] {
            if let Some(target) = start.offset(forward, dc) {
                match board.piece_at(target) {
                    Some(p) if p.color != self.color => {
                        self.add_pawn_moves_with_and_without_promotion(start, target, &mut moves);
                    }
                    Some(_) => {}
                    None => {
                        let mv = Move::EnPassant { from: start, to: target };
                        if self.can_move(board, mv) {
                            moves.push(mv);
                        }
                    }
                }
            }
        }

        moves
    }

    fn add_pawn_moves_with_and_without_promotion(&self, from: ChessField, to: ChessField, moves: &mut Vec<Move>) {
        if to.row() == self.color.promotion_rank() {
            for promotion in PieceType::PROMOTIONS {
                moves.push(Move::Promotion { from, to, promotion });
            }
        } else {
            moves.push(Move::basic(from, to));
        }
    }

    fn generate_moves_from_directions(&self, board: &ChessBoard, start: ChessField, offsets: &[(i8, i8)]) -> Vec<Move> {
        offsets
            .iter()
            .filter_map(|&(dr, dc)| start.offset(dr, dc))
            .filter(|&to| board.piece_at(to).map_or(true, |p| p.color != self.color))
            .map(|to| Move::basic(start, to))
            .collect()
    }

    fn generate_sliding_moves(&self, board: &ChessBoard, start: ChessField, directions: &[(i8, i8)]) -> Vec<Move> {
        let mut moves = Vec::new();
        for &(dr, dc) in directions {
            let mut current = start;
            while let Some(to) = current.offset(dr, dc) {
                match board.piece_at(to) {
                    None => moves.push(Move::basic(start, to)),
                    Some(p) => {
                        if p.color != self.color {
                            moves.push(Move::basic(start, to));
                        }
                        break;
                    }
                }
                current = to;
            }
        }
        moves
    }

    fn generate_king_moves(&self, board: &ChessBoard, start: ChessField) -> Vec<Move> {
        let mut moves = self.generate_moves_from_directions(board, start, &KING_MOVES);
        if start == Move::KingsideCastle(self.color).from() {
            for castle in [Move::KingsideCastle(self.color), Move::QueensideCastle(self.color)] {
                if self.can_move(board, castle) {
                    moves.push(castle);
                }
            }
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use super::*;
    use crate::chess_board::Color;

    fn pseudo_moves(board: &ChessBoard, square: &str) -> Vec<Move> {
        let start = ChessField::from_algebraic(square).unwrap();
        board.piece_at(start).map(|p| p.potential_moves(board, start)).unwrap_or_default()
    }

    fn field(name: &str) -> ChessField {
        ChessField::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_generate_pawn_moves_pseudo_legal() {
        let board = ChessBoard::from_fen("8/8/8/8/4P3/8/8/8 w - - 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "e4").into_iter(), vec!["e4e5"]);

        // blocked pawn a3 by a4
        let board = ChessBoard::from_fen("8/8/8/8/P7/P7/8/8 w - - 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "a3").into_iter(), vec![]);

        let board = ChessBoard::from_fen("8/8/3p4/4Pp2/8/8/8/8 w - f6 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "e5").into_iter(), vec!["e5d6", "e5e6", "e5f6"]);
        assert!(pseudo_moves(&board, "e5").contains(&Move::EnPassant { from: field("e5"), to: field("f6") }));

        let board = ChessBoard::from_fen("8/8/8/8/8/p1p5/1P6/8 w - - 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "b2").into_iter(), vec!["b2b3", "b2b4", "b2a3", "b2c3"]);

        // double step blocked
        let board = ChessBoard::from_fen("8/p7/8/p7/8/8/8/8 b - - 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "a7").into_iter(), vec!["a7a6"]);

        // no capture of own piece
        let board = ChessBoard::from_fen("8/p7/1p6/8/8/8/8/8 b - - 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "a7").into_iter(), vec!["a7a6", "a7a5"]);

        let board = ChessBoard::from_fen("8/1p6/P1P5/8/8/8/8/8 b - - 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "b7").into_iter(), vec!["b7b6", "b7b5", "b7a6", "b7c6"]);

        let board = ChessBoard::from_fen("8/6P1/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "g7").into_iter(), vec!["g7g8q", "g7g8r", "g7g8b", "g7g8n"]);

        let board = ChessBoard::from_fen("3r4/2P5/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_moves(
            pseudo_moves(&board, "c7").into_iter(),
            vec!["c7c8b", "c7c8n", "c7c8r", "c7c8q", "c7d8b", "c7d8n", "c7d8r", "c7d8q"],
        );

        let board = ChessBoard::from_fen("4k1nr/2p3p1/b2pPp1p/8/1nN1P1P1/5N2/Pp3P2/2R2K2 b k - 1 27").unwrap();
        assert_moves(
            pseudo_moves(&board, "b2").into_iter(),
            vec!["b2b1b", "b2b1n", "b2b1q", "b2b1r", "b2c1b", "b2c1n", "b2c1r", "b2c1q"],
        );
    }

    #[test]
    fn test_generate_knight_moves_pseudo_legal() {
        let board = ChessBoard::from_fen("8/8/8/8/3N4/8/8/8 w - - 0 1").unwrap();
        let expected_moves = vec!["d4b3", "d4c2", "d4e2", "d4f3", "d4f5", "d4e6", "d4c6", "d4b5"];
        assert_moves(pseudo_moves(&board, "d4").into_iter(), expected_moves);

        let board = ChessBoard::from_fen("8/8/8/1rn5/2r5/N7/2B5/1Q6 w - - 0 1").unwrap();
        assert_moves(pseudo_moves(&board, "a3").into_iter(), vec!["a3c4", "a3b5"]);
    }

    #[test]
    fn test_generate_sliding_moves_pseudo_legal() {
        let board = ChessBoard::from_fen("8/8/8/8/8/8/1p6/R7 w - - 0 1").unwrap();
        assert_moves(
            pseudo_moves(&board, "a1").into_iter(),
            vec!["a1a2", "a1a3", "a1a4", "a1a5", "a1a6", "a1a7", "a1a8", "a1b1", "a1c1", "a1d1", "a1e1", "a1f1", "a1g1", "a1h1"],
        );

        let board = ChessBoard::from_fen("8/8/8/8/8/2P5/1b6/8 b - - 0 1").unwrap();
        assert_moves(
            pseudo_moves(&board, "b2").into_iter(),
            vec!["b2a1", "b2a3", "b2c1", "b2c3"],
        );

        let board = ChessBoard::from_fen("8/8/8/8/8/1PP5/1QP5/8 w - - 0 1").unwrap();
        assert_moves(
            pseudo_moves(&board, "b2").into_iter(),
            vec!["b2a1", "b2a2", "b2a3", "b2b1", "b2c1"],
        );
    }

    #[test]
    fn test_generate_king_moves_with_castling() {
        let board = ChessBoard::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = pseudo_moves(&board, "e1");
        assert!(moves.contains(&Move::KingsideCastle(Color::White)));
        assert!(moves.contains(&Move::QueensideCastle(Color::White)));
        assert_moves(
            moves.into_iter(),
            vec!["e1d1", "e1d2", "e1e2", "e1f2", "e1f1", "e1g1", "e1c1"],
        );

        // f1 attacked by the rook on f8
        let board = ChessBoard::from_fen("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();
        let moves = pseudo_moves(&board, "e1");
        assert!(!moves.contains(&Move::KingsideCastle(Color::White)));
        assert!(moves.contains(&Move::QueensideCastle(Color::White)));

        // b1 attacked but empty does not prevent queenside castling
        let board = ChessBoard::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(pseudo_moves(&board, "e1").contains(&Move::QueensideCastle(Color::White)));

        // b1 occupied does
        let board = ChessBoard::from_fen("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1").unwrap();
        assert!(!pseudo_moves(&board, "e1").contains(&Move::QueensideCastle(Color::White)));
    }

    #[test]
    fn test_can_attack_ignores_target_contents() {
        let board = ChessBoard::from_fen("8/2P5/8/8/8/8/3p4/8 w - - 0 1").unwrap();
        let black_pawn = board.piece_at(field("d2")).unwrap();
        assert!(black_pawn.can_attack(&board, field("d2"), field("c1")));
        assert!(black_pawn.can_attack(&board, field("d2"), field("e1")));
        assert!(!black_pawn.can_attack(&board, field("d2"), field("d1")));

        let white_pawn = board.piece_at(field("c7")).unwrap();
        assert!(white_pawn.can_attack(&board, field("c7"), field("b8")));
        assert!(!white_pawn.can_attack(&board, field("c7"), field("c8")));
    }

    #[test]
    fn test_can_move_blocked_slider() {
        let board = ChessBoard::starting_position();
        let rook = board.piece_at(field("a1")).unwrap();
        assert!(!rook.can_move(&board, Move::basic(field("a1"), field("a3"))));
        let knight = board.piece_at(field("g1")).unwrap();
        assert!(knight.can_move(&board, Move::basic(field("g1"), field("f3"))));
        assert!(!knight.can_move(&board, Move::basic(field("g1"), field("e2"))));
        let pawn = board.piece_at(field("e2")).unwrap();
        assert!(pawn.can_move(&board, Move::basic(field("e2"), field("e4"))));
        assert!(!pawn.can_move(&board, Move::basic(field("e2"), field("d3"))));
    }

    #[test]
    fn test_legal_moves_of_pinned_piece() {
        // knight on e2 pinned by the rook on e8
        let board = ChessBoard::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let knight = board.piece_at(field("e2")).unwrap();
        assert!(!knight.potential_moves(&board, field("e2")).is_empty());
        assert!(knight.legal_moves(&board, field("e2")).is_empty());
    }
}
