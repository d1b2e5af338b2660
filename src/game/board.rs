//! Gravity-alternating Connect Four position.
//!
//! Pieces are dropped in a four-ply cycle: the first two plies of each cycle fall from the
//! bottom of the board, the next two fall from the top. A column is full once the pieces
//! coming from both ends meet. Rows are numbered from 0 (top) to 5 (bottom).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::axis::Axis;

pub const ROWS: usize = 6;
pub const COLUMNS: usize = 7;
pub const MAX_MOVES: usize = ROWS * COLUMNS;
pub const WIN_LENGTH: usize = 4;

/// Number of planes in the evaluator input.
pub const PLANES: usize = 4;

pub type Plane = [[bool; COLUMNS]; ROWS];
pub type BoardTensor = [[[f32; COLUMNS]; ROWS]; PLANES];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    First,
    Second,
}

impl Player {
    /// Player making the ply with the given zero-based index.
    pub fn for_ply(ply: usize) -> Self {
        if ply % 2 == 0 {
            Player::First
        } else {
            Player::Second
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gravity {
    Bottom,
    Top,
}

impl Gravity {
    pub fn for_ply(ply: usize) -> Self {
        if ply % 4 > 1 {
            Gravity::Top
        } else {
            Gravity::Bottom
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Win(Player),
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    OutOfRange,
    ColumnFull,
    GameOver,
}

impl fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IllegalReason::OutOfRange => "column out of range",
            IllegalReason::ColumnFull => "column is full",
            IllegalReason::GameOver => "game already over",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("illegal move in column {column}: {reason}")]
    IllegalMove { column: usize, reason: IllegalReason },
}

/// Complete game position. `Copy`, so every clone is a deep and independent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    planes: [Plane; 2],
    top_count: [u8; COLUMNS],
    bottom_count: [u8; COLUMNS],
    move_count: usize,
    last_move: Option<(usize, usize)>,
    terminal: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            planes: [[[false; COLUMNS]; ROWS]; 2],
            top_count: [0; COLUMNS],
            bottom_count: [0; COLUMNS],
            move_count: 0,
            last_move: None,
            terminal: false,
        }
    }

    /// Replays `columns` from the empty board.
    pub fn from_moves(columns: &[usize]) -> Result<Self, GameError> {
        let mut board = Self::new();
        for &column in columns {
            board.apply_move(column)?;
        }
        Ok(board)
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn top_count(&self, column: usize) -> usize {
        self.top_count[column] as usize
    }

    pub fn bottom_count(&self, column: usize) -> usize {
        self.bottom_count[column] as usize
    }

    pub fn plane(&self, player: Player) -> &Plane {
        &self.planes[player.index()]
    }

    pub fn side_to_move(&self) -> Player {
        Player::for_ply(self.move_count)
    }

    /// Direction the next piece will fall from.
    pub fn gravity(&self) -> Gravity {
        Gravity::for_ply(self.move_count)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<Player> {
        if self.planes[0][row][column] {
            Some(Player::First)
        } else if self.planes[1][row][column] {
            Some(Player::Second)
        } else {
            None
        }
    }

    pub fn is_column_full(&self, column: usize) -> bool {
        self.top_count(column) + self.bottom_count(column) == ROWS
    }

    pub fn is_legal(&self, column: usize) -> bool {
        self.check_legal(column).is_ok()
    }

    pub fn legal_mask(&self) -> [bool; COLUMNS] {
        std::array::from_fn(|column| self.is_legal(column))
    }

    pub fn legal_moves(&self) -> Vec<usize> {
        (0..COLUMNS).filter(|&column| self.is_legal(column)).collect()
    }

    fn check_legal(&self, column: usize) -> Result<(), GameError> {
        let reason = if column >= COLUMNS {
            IllegalReason::OutOfRange
        } else if self.terminal {
            IllegalReason::GameOver
        } else if self.is_column_full(column) {
            IllegalReason::ColumnFull
        } else {
            return Ok(());
        };
        Err(GameError::IllegalMove { column, reason })
    }

    /// Drops a piece for the side to move. On error the board is left untouched.
    pub fn apply_move(&mut self, column: usize) -> Result<(), GameError> {
        self.check_legal(column)?;

        let mover = self.side_to_move();
        let row = match self.gravity() {
            Gravity::Bottom => {
                self.bottom_count[column] += 1;
                ROWS - self.bottom_count[column] as usize
            }
            Gravity::Top => {
                let row = self.top_count[column] as usize;
                self.top_count[column] += 1;
                row
            }
        };

        self.planes[mover.index()][row][column] = true;
        self.last_move = Some((row, column));
        self.move_count += 1;
        self.terminal = self.terminal || self.check_win() || self.move_count == MAX_MOVES;
        Ok(())
    }

    /// True when the last placed piece completes a line of at least four.
    pub fn check_win(&self) -> bool {
        let Some((row, column)) = self.last_move else {
            return false;
        };
        let plane = &self.planes[Player::for_ply(self.move_count - 1).index()];

        Axis::ALL.iter().any(|axis| {
            let forward = run_length(plane, row, column, axis.delta());
            let backward = run_length(plane, row, column, axis.reversed_delta());
            forward + backward - 1 >= WIN_LENGTH
        })
    }

    pub fn result(&self) -> Option<GameResult> {
        if !self.terminal {
            return None;
        }
        if self.check_win() {
            Some(GameResult::Win(Player::for_ply(self.move_count - 1)))
        } else {
            Some(GameResult::Draw)
        }
    }

    /// Constant fill: 1 when the second player is to move.
    pub fn side_to_move_plane(&self) -> Plane {
        [[self.side_to_move() == Player::Second; COLUMNS]; ROWS]
    }

    /// Constant fill: 1 when the next piece falls from the top.
    pub fn gravity_plane(&self) -> Plane {
        [[self.gravity() == Gravity::Top; COLUMNS]; ROWS]
    }

    /// Evaluator input: first player, second player, side to move, gravity.
    pub fn to_tensor(&self) -> BoardTensor {
        let planes = [
            self.planes[0],
            self.planes[1],
            self.side_to_move_plane(),
            self.gravity_plane(),
        ];
        let mut tensor = [[[0.0f32; COLUMNS]; ROWS]; PLANES];
        for (dst, src) in tensor.iter_mut().zip(planes.iter()) {
            for (dst_row, src_row) in dst.iter_mut().zip(src.iter()) {
                for (value, &occupied) in dst_row.iter_mut().zip(src_row.iter()) {
                    *value = if occupied { 1.0 } else { 0.0 };
                }
            }
        }
        tensor
    }

    /// Row-major `[plane][row][column]` flattening of [`Board::to_tensor`].
    pub fn to_flat_tensor(&self) -> Vec<f32> {
        self.to_tensor()
            .iter()
            .flat_map(|plane| plane.iter().flat_map(|row| row.iter().copied()))
            .collect()
    }
}

fn run_length(plane: &Plane, row: usize, column: usize, (dr, dc): (isize, isize)) -> usize {
    let (mut r, mut c) = (row as isize, column as isize);
    let mut length = 0;
    while (0..ROWS as isize).contains(&r)
        && (0..COLUMNS as isize).contains(&c)
        && plane[r as usize][c as usize]
    {
        length += 1;
        r += dr;
        c += dc;
    }
    length
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                let symbol = match self.cell(row, column) {
                    Some(Player::First) => 'X',
                    Some(Player::Second) => 'O',
                    None => '.',
                };
                write!(f, "{symbol}")?;
                if column + 1 < COLUMNS {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "0 1 2 3 4 5 6")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn board_with_pieces(
        first: &[(usize, usize)],
        second: &[(usize, usize)],
        last: (usize, usize),
        last_mover: Player,
    ) -> Board {
        let mut board = Board::new();
        for &(r, c) in first {
            board.planes[0][r][c] = true;
        }
        for &(r, c) in second {
            board.planes[1][r][c] = true;
        }
        board.planes[last_mover.index()][last.0][last.1] = true;
        board.last_move = Some(last);
        board.move_count = match last_mover {
            Player::First => 1,
            Player::Second => 2,
        };
        board
    }

    fn assert_invariants(board: &Board) {
        for column in 0..COLUMNS {
            assert!(board.top_count(column) + board.bottom_count(column) <= ROWS);
        }
        let mut occupied = 0;
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                assert!(!(board.planes[0][row][column] && board.planes[1][row][column]));
                if board.cell(row, column).is_some() {
                    occupied += 1;
                }
            }
        }
        assert_eq!(occupied, board.move_count());
    }

    /// Column 3 holds first-player pieces on rows 2..=4; the next first-player move
    /// (a bottom drop into column 3) lands on row 1.
    const NEAR_VERTICAL_FOUR: [usize; 16] = [0, 3, 6, 6, 3, 0, 5, 5, 3, 1, 4, 4, 3, 1, 0, 0];

    #[test]
    fn test_empty_board() {
        let board = Board::new();
        assert_eq!(board.move_count(), 0);
        assert_eq!(board.last_move(), None);
        assert!(!board.is_terminal());
        assert!(!board.check_win());
        assert_eq!(board.result(), None);
        assert_eq!(board.legal_moves(), (0..COLUMNS).collect::<Vec<_>>());
        assert_eq!(board.side_to_move(), Player::First);
        assert_eq!(board.gravity(), Gravity::Bottom);
    }

    #[test]
    fn test_gravity_alternates_every_two_plies() {
        let mut board = Board::new();
        let expected_rows = [5, 4, 0, 1, 3, 2];
        for (ply, &row) in expected_rows.iter().enumerate() {
            board.apply_move(0).unwrap();
            assert_eq!(board.last_move(), Some((row, 0)), "ply {ply}");
            assert_eq!(board.cell(row, 0), Some(Player::for_ply(ply)));
        }
        assert_eq!(board.bottom_count(0), 4);
        assert_eq!(board.top_count(0), 2);
        assert!(board.is_column_full(0));
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_seventh_drop_in_column_is_illegal() {
        let mut board = Board::from_moves(&[0; 6]).unwrap();
        let before = board;

        let err = board.apply_move(0).unwrap_err();
        assert_eq!(
            err,
            GameError::IllegalMove {
                column: 0,
                reason: IllegalReason::ColumnFull
            }
        );
        assert_eq!(board, before);
        assert!(!board.is_legal(0));
        assert!(board.is_legal(1));
    }

    #[test]
    fn test_out_of_range_column() {
        let mut board = Board::new();
        assert_matches!(
            board.apply_move(COLUMNS),
            Err(GameError::IllegalMove {
                reason: IllegalReason::OutOfRange,
                ..
            })
        );
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_top_drops_fill_from_row_zero() {
        let board = Board::from_moves(&[1, 2, 1, 2]).unwrap();
        assert_eq!(board.cell(5, 1), Some(Player::First));
        assert_eq!(board.cell(5, 2), Some(Player::Second));
        assert_eq!(board.cell(0, 1), Some(Player::First));
        assert_eq!(board.cell(0, 2), Some(Player::Second));
        assert_eq!(board.top_count(1), 1);
        assert_eq!(board.bottom_count(1), 1);
    }

    #[test]
    fn test_vertical_near_miss_is_not_a_win() {
        let board = Board::from_moves(&NEAR_VERTICAL_FOUR[..13]).unwrap();
        assert_eq!(board.last_move(), Some((2, 3)));
        for row in 2..=4 {
            assert_eq!(board.cell(row, 3), Some(Player::First));
        }
        assert!(!board.check_win());
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_completing_vertical_four_ends_game() {
        let mut board = Board::from_moves(&NEAR_VERTICAL_FOUR).unwrap();
        assert!(!board.is_terminal());
        assert_eq!(board.side_to_move(), Player::First);
        assert_eq!(board.gravity(), Gravity::Bottom);

        board.apply_move(3).unwrap();

        assert_eq!(board.last_move(), Some((1, 3)));
        assert!(board.check_win());
        assert!(board.is_terminal());
        assert_eq!(board.result(), Some(GameResult::Win(Player::First)));
    }

    #[test]
    fn test_terminal_board_rejects_moves() {
        let mut board = Board::from_moves(&NEAR_VERTICAL_FOUR).unwrap();
        board.apply_move(3).unwrap();
        let before = board;

        assert_matches!(
            board.apply_move(2),
            Err(GameError::IllegalMove {
                column: 2,
                reason: IllegalReason::GameOver
            })
        );
        assert_eq!(board, before);
        assert!(board.legal_moves().is_empty());
        assert_eq!(board.legal_mask(), [false; COLUMNS]);
    }

    #[test]
    fn test_rising_diagonal_win() {
        let board = board_with_pieces(&[(5, 0), (4, 1), (3, 2)], &[], (2, 3), Player::First);
        assert!(board.check_win());
    }

    #[test]
    fn test_falling_diagonal_win_from_the_middle() {
        let board = board_with_pieces(&[], &[(1, 1), (3, 3), (4, 4)], (2, 2), Player::Second);
        assert!(board.check_win());
    }

    #[test]
    fn test_diagonal_three_is_not_a_win() {
        let board = board_with_pieces(&[(5, 0), (4, 1)], &[(2, 3)], (3, 2), Player::First);
        assert!(!board.check_win());
    }

    #[test]
    fn test_five_in_a_row_counts_as_win() {
        let board = board_with_pieces(
            &[(5, 0), (5, 1), (5, 3), (5, 4)],
            &[],
            (5, 2),
            Player::First,
        );
        assert!(board.check_win());
    }

    #[test]
    fn test_opponent_pieces_break_lines() {
        let board = board_with_pieces(&[(5, 0), (5, 1), (5, 3)], &[(5, 2)], (5, 4), Player::First);
        assert!(!board.check_win());
    }

    /// A full game that never lines up four; both gravities fill every column.
    const DRAWN_GAME: [usize; MAX_MOVES] = [
        4, 1, 6, 2, 1, 0, 1, 4, 4, 2, 4, 1, 3, 6, 3, 3, 1, 0, 4, 6, 6,
        1, 2, 3, 2, 3, 2, 2, 3, 5, 6, 5, 5, 6, 0, 4, 0, 5, 0, 0, 5, 5,
    ];

    #[test]
    fn test_full_board_without_line_is_draw() {
        let mut board = Board::from_moves(&DRAWN_GAME[..MAX_MOVES - 1]).unwrap();
        assert!(!board.is_terminal());
        assert_eq!(board.result(), None);
        assert_eq!(board.side_to_move(), Player::Second);
        assert_eq!(board.gravity(), Gravity::Bottom);
        assert_eq!(board.legal_moves(), vec![5]);

        board.apply_move(5).unwrap();

        assert_eq!(board.move_count(), MAX_MOVES);
        assert_eq!(board.last_move(), Some((1, 5)));
        assert_eq!(board.cell(1, 5), Some(Player::Second));
        assert!(!board.check_win());
        assert!(board.is_terminal());
        assert_eq!(board.result(), Some(GameResult::Draw));
        assert!((0..COLUMNS).all(|column| board.is_column_full(column)));
        assert_eq!(board.top_count(2) + board.bottom_count(2), ROWS);
        assert_eq!(board, Board::from_moves(&DRAWN_GAME).unwrap());
    }

    #[test]
    fn test_invariants_hold_over_pseudo_random_games() {
        for seed in 0..20u64 {
            let mut board = Board::new();
            let mut state = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            assert_invariants(&board);
            while !board.is_terminal() {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let legal = board.legal_moves();
                let column = legal[(state >> 33) as usize % legal.len()];
                let gravity = board.gravity();
                let (top, bottom) = (board.top_count(column), board.bottom_count(column));

                board.apply_move(column).unwrap();

                let (row, _) = board.last_move().unwrap();
                match gravity {
                    Gravity::Bottom => assert_eq!(row, ROWS - 1 - bottom),
                    Gravity::Top => assert_eq!(row, top),
                }
                assert_invariants(&board);
            }
            assert!(board.move_count() <= MAX_MOVES);
            assert!(board.result().is_some());
        }
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Board::from_moves(&[3, 3]).unwrap();
        let mut copy = original;
        copy.apply_move(4).unwrap();
        assert_eq!(original.move_count(), 2);
        assert_eq!(copy.move_count(), 3);
        assert_eq!(original.cell(0, 4), None);
    }

    #[test]
    fn test_tensor_planes() {
        let board = Board::from_moves(&[3]).unwrap();
        let tensor = board.to_tensor();
        assert_eq!(tensor[0][5][3], 1.0);
        assert_eq!(tensor[0].iter().flatten().sum::<f32>(), 1.0);
        assert_eq!(tensor[1].iter().flatten().sum::<f32>(), 0.0);
        assert!(tensor[2].iter().flatten().all(|&v| v == 1.0));
        assert!(tensor[3].iter().flatten().all(|&v| v == 0.0));

        let board = Board::from_moves(&[3, 4]).unwrap();
        let tensor = board.to_tensor();
        assert_eq!(tensor[1][5][4], 1.0);
        assert!(tensor[2].iter().flatten().all(|&v| v == 0.0));
        assert!(tensor[3].iter().flatten().all(|&v| v == 1.0));
    }

    #[test]
    fn test_flat_tensor_layout() {
        let board = Board::from_moves(&[6]).unwrap();
        let flat = board.to_flat_tensor();
        assert_eq!(flat.len(), PLANES * ROWS * COLUMNS);
        assert_eq!(flat[5 * COLUMNS + 6], 1.0);
        assert_eq!(flat[ROWS * COLUMNS..2 * ROWS * COLUMNS].iter().sum::<f32>(), 0.0);
    }

    #[test]
    fn test_display() {
        let board = Board::from_moves(&[0, 1]).unwrap();
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), ROWS + 1);
        assert_eq!(lines[5], "X O . . . . .");
    }
}
