use shared::{Piece, PieceRef, Player, BOARD_SIZE};

const SIZE: usize = BOARD_SIZE as usize;

/// Occupancy grid derived from both rosters.
///
/// A board is only ever produced by [`Board::project`]; nothing mutates a cell
/// directly, so it cannot drift from the rosters it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<PieceRef>; SIZE]; SIZE],
}

impl Board {
    /// Projects the two rosters onto a fresh grid.
    pub fn project(roster_a: &[Piece], roster_b: &[Piece]) -> Self {
        let mut cells = [[None; SIZE]; SIZE];

        for (player, roster) in [(Player::A, roster_a), (Player::B, roster_b)] {
            for piece in roster {
                debug_assert!(in_bounds(piece.x, piece.y), "piece off board: {piece:?}");
                let cell = &mut cells[piece.y as usize][piece.x as usize];
                debug_assert!(cell.is_none(), "two pieces share ({}, {})", piece.x, piece.y);
                *cell = Some(PieceRef::new(player, piece.kind));
            }
        }

        Self { cells }
    }

    /// Occupant at `(x, y)`, or `None` when the cell is empty or off the board.
    pub fn get(&self, x: i32, y: i32) -> Option<PieceRef> {
        if !in_bounds(x, y) {
            return None;
        }
        self.cells[y as usize][x as usize]
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    /// Rows indexed by `y` in the shape sent to clients.
    pub fn to_rows(&self) -> Vec<Vec<Option<PieceRef>>> {
        self.cells.iter().map(|row| row.to_vec()).collect()
    }
}

/// Whether `(x, y)` lies on the board.
pub fn in_bounds(x: i32, y: i32) -> bool {
    (0..BOARD_SIZE).contains(&x) && (0..BOARD_SIZE).contains(&y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{starting_roster, PieceKind};

    #[test]
    fn test_empty_projection() {
        let board = Board::project(&[], &[]);
        assert_eq!(board.occupied(), 0);
        assert_eq!(board.to_rows(), vec![vec![None; SIZE]; SIZE]);
    }

    #[test]
    fn test_starting_projection() {
        let board = Board::project(&starting_roster(Player::A), &starting_roster(Player::B));

        assert_eq!(board.occupied(), 10);
        assert_eq!(board.get(2, 0), Some(PieceRef::new(Player::A, PieceKind::H1)));
        assert_eq!(board.get(4, 4), Some(PieceRef::new(Player::B, PieceKind::H2)));
        for y in 1..4 {
            for x in 0..BOARD_SIZE {
                assert_eq!(board.get(x, y), None);
            }
        }
    }

    #[test]
    fn test_rows_are_indexed_by_y() {
        let board = Board::project(&[Piece::new(PieceKind::P1, 3, 1)], &[]);
        let rows = board.to_rows();
        assert_eq!(rows[1][3], Some(PieceRef::new(Player::A, PieceKind::P1)));
        assert_eq!(rows[3][1], None);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let board = Board::project(&starting_roster(Player::A), &[]);
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(BOARD_SIZE, 0), None);
        assert_eq!(board.get(0, BOARD_SIZE), None);
    }

    #[test]
    fn test_in_bounds() {
        assert!(in_bounds(0, 0));
        assert!(in_bounds(4, 4));
        assert!(!in_bounds(5, 0));
        assert!(!in_bounds(0, -1));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let a = vec![Piece::new(PieceKind::H1, 2, 2), Piece::new(PieceKind::P1, 0, 1)];
        let b = vec![Piece::new(PieceKind::P3, 4, 3)];
        assert_eq!(Board::project(&a, &b), Board::project(&a, &b));
    }
}
