use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Array2;

use crate::board::Board;
use crate::cell::{Dimension, EdgeCell, EdgeId, LatticePoint, Location, Slash, VertexId};

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// A clue or pre-applied move was placed outside the bounds specified by
    /// `dims` on a builder.
    FeatureOutOfBounds,
    /// A clue lies outside the meaningful degree range `0..=4`.
    ClueOutOfRange,
    /// A description character is neither a decimal clue nor a lowercase
    /// skip letter, or the description overruns the lattice.
    MalformedDescription,
    /// A pre-applied move overwrote a cell, overflowed a clue, or closed a
    /// loop.
    InconsistentMoves,
}

impl Display for BuilderInvalidReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FeatureOutOfBounds => "feature out of bounds",
            Self::ClueOutOfRange => "clue out of range",
            Self::MalformedDescription => "malformed description",
            Self::InconsistentMoves => "inconsistent pre-applied moves",
        })
    }
}

impl std::error::Error for BuilderInvalidReason {}

/// A builder for Slant boards: set dimensions, then add clues (directly or
/// from a run-length description) and optional pre-applied moves.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save
/// their state at some point.
#[derive(Clone)]
pub struct SlantBoardBuilder {
    // width, height
    dims: (Dimension, Dimension),
    clues: Array2<Option<u8>>,
    premoves: Vec<(Location, Slash)>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl Default for SlantBoardBuilder {
    fn default() -> Self {
        Self::with_dims((NonZero::new(5).unwrap(), NonZero::new(5).unwrap()))
    }
}

impl SlantBoardBuilder {
    /// Construct a new builder with the specified dimensions, in `(x, y)`
    /// order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            // one lattice point beyond the cells on each axis
            clues: Array2::from_shape_simple_fn((dims.1.get() + 1, dims.0.get() + 1), || None),
            premoves: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    /// Construct a builder with `dims` and the clues of `desc` already
    /// parsed.
    pub fn from_desc(dims: (Dimension, Dimension), desc: &str) -> Self {
        let mut builder = Self::with_dims(dims);
        builder.parse_desc(desc);
        builder
    }

    /// Place a degree clue at the lattice point `location`.
    ///
    /// May cause the builder to enter a
    /// [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) or
    /// [`ClueOutOfRange`](BuilderInvalidReason::ClueOutOfRange) invalid
    /// state. If the builder is already in an invalid state, this function
    /// does nothing.
    pub fn add_clue(&mut self, location: Location, clue: u8) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if location.0 > self.dims.0.get() || location.1 > self.dims.1.get() {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }
        if clue > 4 {
            self.invalid_reasons.push(BuilderInvalidReason::ClueOutOfRange);
            return self;
        }

        // the clue grid is ndarray-indexed (row, column), so (y, x)
        self.clues[[location.1, location.0]] = Some(clue);
        self
    }

    /// Queue a pre-applied move: the cell at `location` starts out assigned
    /// to `slash`. Pre-applied moves run through the ordinary assignment
    /// path at build time, in order, and land on the move log.
    pub fn add_move(&mut self, location: Location, slash: Slash) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if location.0 >= self.dims.0.get() || location.1 >= self.dims.1.get() {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }

        self.premoves.push((location, slash));
        self
    }

    /// Parse a run-length clue description: a decimal digit places a clue
    /// and advances one lattice point, a lowercase letter skips `a` = 1 up
    /// to `z` = 26 points. The position wraps column-first across rows of
    /// `width + 1` points.
    pub fn parse_desc(&mut self, desc: &str) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        let (w, h) = (self.dims.0.get(), self.dims.1.get());
        let (mut x, mut y) = (0usize, 0usize);
        for c in desc.chars() {
            if c.is_ascii_lowercase() {
                x += (c as u8 - b'a' + 1) as usize;
            } else if let Some(d) = c.to_digit(10) {
                if d > 4 {
                    self.invalid_reasons.push(BuilderInvalidReason::ClueOutOfRange);
                    return self;
                }
                if y > h {
                    self.invalid_reasons.push(BuilderInvalidReason::MalformedDescription);
                    return self;
                }
                self.clues[[y, x]] = Some(d as u8);
                x += 1;
            } else {
                self.invalid_reasons.push(BuilderInvalidReason::MalformedDescription);
                return self;
            }

            while x > w {
                y += 1;
                x -= w + 1;
            }
        }

        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)`
    /// otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Board`], wiring the
    /// cell/lattice incidence structure and applying any pre-applied moves.
    pub fn build(&self) -> Result<Board, Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(self.invalid_reasons.clone());
        }

        let (w, h) = (self.dims.0.get(), self.dims.1.get());

        let mut edges = Vec::with_capacity(2 + w * h);
        for slash in [Slash::Forward, Slash::Back] {
            edges.push(EdgeCell {
                loc: Location(0, 0),
                state: Some(slash),
                vertices: [VertexId(0); 4],
                last_trial: None,
            });
        }
        for y in 0..h {
            for x in 0..w {
                edges.push(EdgeCell {
                    loc: Location(x, y),
                    state: None,
                    vertices: [VertexId(0); 4],
                    last_trial: None,
                });
            }
        }

        let mut vertices = Vec::with_capacity((w + 1) * (h + 1));
        for y in 0..=h {
            for x in 0..=w {
                vertices.push(LatticePoint {
                    loc: Location(x, y),
                    clue: self.clues[[y, x]],
                    edges: [EdgeId::FORWARD_SENTINEL; 4],
                });
            }
        }

        // wire lattice slots to cells and cell slots to lattice points; the
        // two loops over (dy, dx) fix the slot orderings documented on
        // LatticePoint and EdgeCell
        for y in 0..=h {
            for x in 0..=w {
                let vid = y * (w + 1) + x;
                let mut slot = 0;
                for dy in [-1isize, 0] {
                    for dx in [-1isize, 0] {
                        let cx = x as isize + dx;
                        let cy = y as isize + dy;
                        vertices[vid].edges[slot] =
                            if cx < 0 || cy < 0 || cx == w as isize || cy == h as isize {
                                // off-board slots hold the sentinel that
                                // points away from this lattice point
                                if dx + dy == -1 {
                                    EdgeId::BACK_SENTINEL
                                } else {
                                    EdgeId::FORWARD_SENTINEL
                                }
                            } else {
                                EdgeId((2 + cy as usize * w + cx as usize) as u32)
                            };

                        if y < h && x < w {
                            let vx = (x as isize - dx) as usize;
                            let vy = (y as isize - dy) as usize;
                            edges[2 + y * w + x].vertices[slot] =
                                VertexId((vy * (w + 1) + vx) as u32);
                        }
                        slot += 1;
                    }
                }
            }
        }

        let mut board = Board {
            dims: self.dims,
            edges,
            vertices,
            moves: Vec::new(),
        };

        for &(loc, slash) in &self.premoves {
            let e = board.edge_id(loc.0, loc.1);
            if board.state(e).is_some() || board.assign(e, slash).is_err() {
                return Err(vec![BuilderInvalidReason::InconsistentMoves]);
            }
        }

        Ok(board)
    }
}
