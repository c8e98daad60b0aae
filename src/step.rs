use strum::VariantArray;

/// One of the eight neighbor directions around a lattice point.
///
/// The variant order is the solver's fixed scan order (row by row, top to
/// bottom); determinism of the move log depends on it.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub(crate) enum Compass {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Compass {
    /// The four diagonal directions, in scan order.
    pub(crate) const DIAGONALS: [Self; 4] =
        [Self::NorthWest, Self::NorthEast, Self::SouthWest, Self::SouthEast];

    pub(crate) fn offsets(self) -> (isize, isize) {
        match self {
            Self::NorthWest => (-1, -1),
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
            Self::SouthWest => (-1, 1),
            Self::South => (0, 1),
            Self::SouthEast => (1, 1),
        }
    }

    pub(crate) fn is_diagonal(self) -> bool {
        let (dx, dy) = self.offsets();
        dx != 0 && dy != 0
    }
}
