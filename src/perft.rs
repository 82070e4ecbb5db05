use crate::chess_board::ChessBoard;

/// Number of leaf positions reachable in exactly `depth` plies.
pub fn perft(board: &ChessBoard, depth: u8) -> u64 {
    if depth == 0 {
        return 1u64;
    }

    let mut node_count = 0u64;
    for mv in board.legal_moves() {
        if let Ok(new_board) = board.make_move(mv) {
            node_count += perft(&new_board, depth - 1);
        }
    }
    node_count
}

/// Perft split by root move, sorted by the move's coordinate form.
pub fn divide(board: &ChessBoard, depth: u8) -> Vec<(String, u64)> {
    let mut result_moves: Vec<(String, u64)> = board
        .legal_moves()
        .into_iter()
        .filter_map(|mv| {
            board
                .make_move(mv)
                .ok()
                .map(|new_board| (mv.as_algebraic(), perft(&new_board, depth.saturating_sub(1))))
        })
        .collect();
    result_moves.sort();
    result_moves
}
