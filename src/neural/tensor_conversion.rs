use tch::Tensor;

use crate::game::board::{Board, COLUMNS, PLANES, ROWS};

/// Encodes one board as a `[1, 4, 6, 7]` float tensor.
///
/// Planes: first player's stones, second player's stones, side to move after the last
/// move, gravity of the next move.
pub fn board_to_tensor(board: &Board) -> Tensor {
    boards_to_tensor(std::slice::from_ref(board))
}

/// Stacks several boards into a `[N, 4, 6, 7]` batch.
pub fn boards_to_tensor(boards: &[Board]) -> Tensor {
    let mut features = Vec::with_capacity(boards.len() * PLANES * ROWS * COLUMNS);
    for board in boards {
        features.extend(board.to_flat_tensor());
    }
    Tensor::from_slice(&features).view([
        boards.len() as i64,
        PLANES as i64,
        ROWS as i64,
        COLUMNS as i64,
    ])
}
