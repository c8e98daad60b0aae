use std::fmt::{Display, Formatter};
use std::num::NonZero;

use strum::VariantArray;

/// Coordinate scalar for cells and lattice points.
pub type Coord = usize;

/// A nonzero board dimension, in cells.
pub type Dimension = NonZero<Coord>;

/// An `(x, y)` grid position, with `(0, 0)` at the top left.
///
/// The same type addresses both kinds of position on a board: cells, which
/// run to the exclusive `W`×`H` bounds, and lattice points, which extend
/// one further, to the inclusive `W` and `H`. Which range applies is fixed
/// by the accessor a location is handed to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Location(pub Coord, pub Coord);

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// One of the two diagonal orientations a cell can hold.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Slash {
    /// `╱`, connecting the cell's bottom-left and top-right lattice points.
    Forward,
    /// `╲`, connecting the cell's top-left and bottom-right lattice points.
    Back,
}

impl Slash {
    /// The opposite orientation.
    pub fn flip(self) -> Self {
        match self {
            Self::Forward => Self::Back,
            Self::Back => Self::Forward,
        }
    }

    /// ASCII form, as used in move lists and game descriptions.
    pub fn as_char(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Back => '\\',
        }
    }

    pub(crate) fn glyph(self) -> char {
        match self {
            Self::Forward => '╱',
            Self::Back => '╲',
        }
    }
}

impl Display for Slash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

impl TryFrom<char> for Slash {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '/' | '╱' => Ok(Self::Forward),
            '\\' | '╲' => Ok(Self::Back),
            other => Err(other),
        }
    }
}

/// Index of a cell in the edge arena. Indices 0 and 1 are the two boundary
/// sentinels; real cells start at 2.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub(crate) struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Sentinel permanently holding `╱`; wired into lattice slots 0 and 3
    /// that fall outside the grid.
    pub(crate) const FORWARD_SENTINEL: Self = Self(0);
    /// Sentinel permanently holding `╲`; wired into lattice slots 1 and 2
    /// that fall outside the grid.
    pub(crate) const BACK_SENTINEL: Self = Self(1);

    pub(crate) fn is_sentinel(self) -> bool {
        self.0 < 2
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a lattice point in the vertex arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub(crate) struct VertexId(pub(crate) u32);

impl VertexId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A unit square of the grid holding one diagonal.
///
/// Surrounding lattice points, in slot order `(+1,+1) (0,+1) (+1,0) (0,0)`:
///
/// ```text
///  │ │
/// ─3─2─
///  │ │
/// ─1─0─
///  │ │
/// ```
///
/// A back-slash joins slots 0 and 3, a forward-slash slots 1 and 2.
pub(crate) struct EdgeCell {
    pub(crate) loc: Location,
    pub(crate) state: Option<Slash>,
    pub(crate) vertices: [VertexId; 4],
    /// Move log snapshot from the most recent trial at this cell; a trial
    /// reruns only once the log stops moving between visits.
    pub(crate) last_trial: Option<Vec<EdgeId>>,
}

/// A lattice point, optionally carrying a degree clue.
///
/// Incident cells, in slot order `(-1,-1) (0,-1) (-1,0) (0,0)`:
///
/// ```text
/// 0│1
/// ─┼─
/// 2│3
/// ```
///
/// Slots beyond the boundary hold the sentinel whose fixed orientation
/// points away from this lattice point.
pub(crate) struct LatticePoint {
    pub(crate) loc: Location,
    pub(crate) clue: Option<u8>,
    pub(crate) edges: [EdgeId; 4],
}

/// The orientation that makes the cell in slot `n` touch the owning
/// lattice point.
pub(crate) fn connect_slash(slot: usize) -> Slash {
    if slot % 3 == 0 {
        Slash::Back
    } else {
        Slash::Forward
    }
}

/// The orientation that keeps the cell in slot `n` away from the owning
/// lattice point.
pub(crate) fn anti_slash(slot: usize) -> Slash {
    connect_slash(slot).flip()
}

/// The two slots on the side of a lattice point facing the cardinal
/// direction `(dx, dy)`, lower slot first.
pub(crate) fn edge_pair(dx: isize, dy: isize) -> (usize, usize) {
    debug_assert!(dx.abs() + dy.abs() == 1);
    let e1 = (dx > 0) as usize + 2 * ((dy > 0) as usize);
    (e1, e1 + 1 + dx.unsigned_abs())
}

/// The single slot shared with the diagonal neighbor in direction `(dx, dy)`.
pub(crate) fn diagonal_slot(dx: isize, dy: isize) -> usize {
    debug_assert!(dx != 0 && dy != 0);
    (dx > 0) as usize + 2 * ((dy > 0) as usize)
}
