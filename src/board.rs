use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use unordered_pair::UnorderedPair;

use crate::cell::{Coord, Dimension, EdgeCell, EdgeId, LatticePoint, Location, Slash, VertexId};
use crate::solver::Contradiction;

const JUNCTIONS: [char; 9] = ['┌', '┬', '┐', '├', '┼', '┤', '└', '┴', '┘'];

/// A Slant board: a `W`×`H` grid of diagonal cells between `(W+1)`×`(H+1)`
/// lattice points, plus the ordered log of assignments made so far.
///
/// Boards are built with a [`SlantBoardBuilder`](crate::builder::SlantBoardBuilder)
/// and solved in place with [`solve`](Board::solve); the move log is the
/// solver's primary output.
pub struct Board {
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) edges: Vec<EdgeCell>,
    pub(crate) vertices: Vec<LatticePoint>,
    pub(crate) moves: Vec<EdgeId>,
}

impl Board {
    /// Board width in cells.
    pub fn width(&self) -> Coord {
        self.dims.0.get()
    }

    /// Board height in cells.
    pub fn height(&self) -> Coord {
        self.dims.1.get()
    }

    pub(crate) fn edge_id(&self, x: Coord, y: Coord) -> EdgeId {
        EdgeId((2 + y * self.width() + x) as u32)
    }

    pub(crate) fn vertex_id(&self, x: Coord, y: Coord) -> VertexId {
        VertexId((y * (self.width() + 1) + x) as u32)
    }

    pub(crate) fn edge(&self, e: EdgeId) -> &EdgeCell {
        &self.edges[e.index()]
    }

    pub(crate) fn vertex(&self, v: VertexId) -> &LatticePoint {
        &self.vertices[v.index()]
    }

    pub(crate) fn state(&self, e: EdgeId) -> Option<Slash> {
        self.edge(e).state
    }

    pub(crate) fn clue(&self, v: VertexId) -> Option<u8> {
        self.vertex(v).clue
    }

    pub(crate) fn vertex_edge(&self, v: VertexId, slot: usize) -> EdgeId {
        self.vertex(v).edges[slot]
    }

    pub(crate) fn vertex_is_interior(&self, v: VertexId) -> bool {
        let Location(x, y) = self.vertex(v).loc;
        x >= 1 && x < self.width() && y >= 1 && y < self.height()
    }

    /// The lattice point one step `(dx, dy)` from `v`, if it is on the board.
    pub(crate) fn adjacent_vertex(&self, v: VertexId, dx: isize, dy: isize) -> Option<VertexId> {
        // a step off the board wraps around usize and fails the inclusive
        // lattice bounds test
        let Location(x, y) = self.vertex(v).loc;
        let x = x.wrapping_add_signed(dx);
        let y = y.wrapping_add_signed(dy);
        (x <= self.width() && y <= self.height()).then(|| self.vertex_id(x, y))
    }

    /// The clue at lattice point `loc`, if any.
    pub fn clue_at(&self, loc: Location) -> Option<u8> {
        (loc.0 <= self.width() && loc.1 <= self.height())
            .then(|| self.clue(self.vertex_id(loc.0, loc.1)))
            .flatten()
    }

    /// The diagonal assigned to the cell at `loc`, if any.
    pub fn slash_at(&self, loc: Location) -> Option<Slash> {
        (loc.0 < self.width() && loc.1 < self.height())
            .then(|| self.state(self.edge_id(loc.0, loc.1)))
            .flatten()
    }

    /// Snapshot of every cell's state, indexed `[y, x]`.
    pub fn grid(&self) -> Array2<Option<Slash>> {
        Array2::from_shape_fn((self.height(), self.width()), |(y, x)| {
            self.state(self.edge_id(x, y))
        })
    }

    /// The assignments made so far, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = (Slash, Location)> + '_ {
        self.moves.iter().map(|&e| {
            let cell = self.edge(e);
            (cell.state.unwrap(), cell.loc)
        })
    }

    /// The move log rendered in the collection's `/x,y` and `\x,y` form.
    pub fn move_strings(&self) -> Vec<String> {
        self.moves()
            .map(|(slash, Location(x, y))| format!("{}{},{}", slash.as_char(), x, y))
            .collect()
    }

    /// Re-serialize the clue layout as a canonical run-length description:
    /// digits place clues, letters skip that many unclued lattice points
    /// (`a` = 1 .. `z` = 26, longer runs split).
    pub fn desc(&self) -> String {
        let mut out = String::new();
        let mut run = 0usize;
        let mut flush = |out: &mut String, run: &mut usize| {
            while *run > 0 {
                let n = (*run).min(26);
                out.push((b'a' + n as u8 - 1) as char);
                *run -= n;
            }
        };
        for point in &self.vertices {
            match point.clue {
                None => run += 1,
                Some(d) => {
                    flush(&mut out, &mut run);
                    out.push((b'0' + d) as char);
                }
            }
        }
        flush(&mut out, &mut run);
        out
    }

    // --- edge state store ---

    /// Write `slash` into an unset cell, log the move, and check the degree
    /// and loop invariants at every incident lattice point.
    ///
    /// On `Err` the assignment is already on the log; the nearest trial
    /// frame owns rolling it back.
    pub(crate) fn assign(&mut self, e: EdgeId, slash: Slash) -> Result<(), Contradiction> {
        debug_assert!(!e.is_sentinel());
        debug_assert!(self.edges[e.index()].state.is_none());
        self.edges[e.index()].state = Some(slash);
        self.moves.push(e);
        log::trace!("assign {} at {}", slash.as_char(), self.edges[e.index()].loc);

        let incident = self.edges[e.index()].vertices;
        for v in incident {
            self.check_vertex(v)?;
        }
        self.cycle_check(e)
    }

    /// Current move log length, for later rollback.
    pub(crate) fn mark(&self) -> usize {
        self.moves.len()
    }

    /// Pop assignments until the log is `mark` long again.
    pub(crate) fn rollback_to(&mut self, mark: usize) {
        while self.moves.len() > mark {
            let e = self.moves.pop().unwrap();
            self.edges[e.index()].state = None;
        }
    }

    /// Write and log a state without invariant checks. Only used to commit
    /// the opposite of a refuted trial, whose soundness the refutation
    /// already established.
    pub(crate) fn force(&mut self, e: EdgeId, slash: Slash) {
        self.edges[e.index()].state = Some(slash);
        self.moves.push(e);
        log::debug!("commit {} at {}", slash.as_char(), self.edges[e.index()].loc);
    }

    /// Compare the move log against the snapshot taken at this cell's
    /// previous trial, then snapshot the current log. Trials only proceed
    /// when nothing has moved since the last attempt.
    pub(crate) fn trial_guard(&mut self, e: EdgeId) -> bool {
        let unchanged = self.edges[e.index()].last_trial.as_deref() == Some(self.moves.as_slice());
        self.edges[e.index()].last_trial = Some(self.moves.clone());
        unchanged
    }

    // --- degree calculus ---

    /// Solved incident cells of `v` as `(connects, edge)` pairs. A cell in
    /// slot `n` connects iff `n % 3 == 0` exactly when it holds `╲`.
    pub(crate) fn solved_edges(&self, v: VertexId) -> impl Iterator<Item = (bool, EdgeId)> + '_ {
        self.vertex(v).edges.iter().enumerate().filter_map(move |(slot, &e)| {
            self.state(e).map(|s| ((slot % 3 == 0) == (s == Slash::Back), e))
        })
    }

    /// Unset incident cells of `v` as `(slot, edge)` pairs.
    pub(crate) fn unsolved_edges(&self, v: VertexId) -> impl Iterator<Item = (usize, EdgeId)> + '_ {
        self.vertex(v)
            .edges
            .iter()
            .enumerate()
            .filter_map(move |(slot, &e)| self.state(e).is_none().then_some((slot, e)))
    }

    pub(crate) fn connected_edges(&self, v: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.solved_edges(v).filter(|(connects, _)| *connects).map(|(_, e)| e)
    }

    /// Number of solved incident cells touching `v`.
    pub(crate) fn degree(&self, v: VertexId) -> usize {
        self.connected_edges(v).count()
    }

    /// Number of solved incident cells pointing away from `v`. Boundary
    /// sentinels always count here.
    pub(crate) fn antidegree(&self, v: VertexId) -> usize {
        self.solved_edges(v).filter(|(connects, _)| !connects).count()
    }

    /// A lattice point is solved once unclued, or once all four incident
    /// cells are decided.
    pub(crate) fn vertex_is_solved(&self, v: VertexId) -> bool {
        match self.clue(v) {
            None => true,
            Some(_) => self.degree(v) + self.antidegree(v) == 4,
        }
    }

    fn check_vertex(&self, v: VertexId) -> Result<(), Contradiction> {
        if let Some(d) = self.clue(v) {
            if self.degree(v) > d as usize || self.antidegree(v) > 4 - d as usize {
                return Err(Contradiction::DegreeOverflow { at: self.vertex(v).loc });
            }
        }
        Ok(())
    }

    // --- cycle oracle ---

    /// The two lattice points a solved cell joins; `None` for unset cells
    /// and sentinels.
    pub(crate) fn endpoints(&self, e: EdgeId) -> Option<UnorderedPair<VertexId>> {
        if e.is_sentinel() {
            return None;
        }
        let cell = self.edge(e);
        match cell.state? {
            Slash::Back => Some(UnorderedPair(cell.vertices[0], cell.vertices[3])),
            Slash::Forward => Some(UnorderedPair(cell.vertices[1], cell.vertices[2])),
        }
    }

    /// Follow a solved cell from one of its endpoints to the other.
    pub(crate) fn traverse(&self, e: EdgeId, from: VertexId) -> Option<VertexId> {
        let UnorderedPair(a, b) = self.endpoints(e)?;
        if from == a {
            Some(b)
        } else if from == b {
            Some(a)
        } else {
            None
        }
    }

    /// Depth-first search over connected cells from `start`; returns the
    /// cells of a loop through `start` if one exists.
    pub(crate) fn find_cycle(&self, start: VertexId) -> Option<Vec<EdgeId>> {
        let mut visited = HashSet::new();
        self.cycle_from(start, start, &mut visited, true)
    }

    fn cycle_from(
        &self,
        at: VertexId,
        target: VertexId,
        visited: &mut HashSet<EdgeId>,
        root: bool,
    ) -> Option<Vec<EdgeId>> {
        if !root && at == target {
            return Some(Vec::new());
        }
        for e in self.connected_edges(at).collect::<Vec<_>>() {
            if visited.insert(e) {
                let next = self.traverse(e, at).unwrap();
                if let Some(mut cycle) = self.cycle_from(next, target, visited, false) {
                    cycle.push(e);
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn cycle_check(&self, e: EdgeId) -> Result<(), Contradiction> {
        let UnorderedPair(a, b) = self.endpoints(e).unwrap();
        if self.degree(a) > 1 && self.degree(b) > 1 {
            if let Some(cycle) = self.find_cycle(a) {
                return Err(Contradiction::ClosedLoop {
                    through: cycle.into_iter().map(|e| self.edge(e).loc).collect(),
                });
            }
        }
        Ok(())
    }

    // --- connectivity export ---

    /// The undirected graph induced on lattice points by the solved cells,
    /// each edge weighted with the diagonal that realizes it.
    pub fn connection_graph(&self) -> UnGraphMap<Location, Slash> {
        let mut graph = UnGraphMap::with_capacity(self.vertices.len(), self.edges.len());
        for point in &self.vertices {
            graph.add_node(point.loc);
        }
        for i in 2..self.edges.len() {
            let e = EdgeId(i as u32);
            if let Some(UnorderedPair(a, b)) = self.endpoints(e) {
                graph.add_edge(
                    self.vertex(a).loc,
                    self.vertex(b).loc,
                    self.state(e).unwrap(),
                );
            }
        }
        graph
    }

    /// Whether the board is completely and consistently solved: every cell
    /// decided, every clue met exactly, and no loop among the connections.
    pub fn is_solved(&self) -> bool {
        self.edges[2..].iter().all(|cell| cell.state.is_some())
            && self.vertices.iter().all(|point| match point.clue {
                None => true,
                Some(d) => {
                    let v = self.vertex_id(point.loc.0, point.loc.1);
                    self.degree(v) == d as usize
                }
            })
            && !petgraph::algo::is_cyclic_undirected(&self.connection_graph())
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (w, h) = (self.width(), self.height());
        for y in 0..=h {
            let mut row = String::new();
            for x in 0..=w {
                if x > 0 {
                    row.push('─');
                }
                row.push(match self.clue(self.vertex_id(x, y)) {
                    Some(d) => (b'0' + d) as char,
                    None => {
                        JUNCTIONS[((y != 0) as usize + (y == h) as usize) * 3
                            + (x != 0) as usize
                            + (x == w) as usize]
                    }
                });
            }
            writeln!(f, "{row}")?;

            if y < h {
                let mut cells = String::new();
                cells.push('│');
                for x in 0..w {
                    cells.push(self.state(self.edge_id(x, y)).map_or(' ', Slash::glyph));
                    cells.push('│');
                }
                writeln!(f, "{cells}")?;
            }
        }
        Ok(())
    }
}
