/// Line directions scanned by the win check.
///
/// Each axis is stored as one half-delta; the opposite direction is obtained by negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Vertical,
    RisingDiagonal,
    Horizontal,
    FallingDiagonal,
}

impl Axis {
    pub const ALL: [Axis; 4] = [
        Axis::Vertical,
        Axis::RisingDiagonal,
        Axis::Horizontal,
        Axis::FallingDiagonal,
    ];

    /// (row delta, column delta); row 0 is the top of the board.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Axis::Vertical => (-1, 0),
            Axis::RisingDiagonal => (-1, 1),
            Axis::Horizontal => (0, 1),
            Axis::FallingDiagonal => (1, 1),
        }
    }

    pub const fn reversed_delta(self) -> (isize, isize) {
        let (dr, dc) = self.delta();
        (-dr, -dc)
    }
}
