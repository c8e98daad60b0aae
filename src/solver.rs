//! The propagation engine: a FIFO queue of unsolved nodes, a local LIFO
//! closure around each node, and the speculative edge trial with rollback.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexSet;
use strum::VariantArray;

use crate::board::Board;
use crate::cell::{EdgeId, Location, Slash, VertexId};
use crate::rules;

/// A violated invariant raised by an assignment.
///
/// Contradictions are expected during trials, where they drive deductions;
/// one that reaches the outer loop uncaught stalls the solve instead.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Contradiction {
    /// A lattice point exceeded its clue, or the complement exceeded
    /// `4 - clue`.
    DegreeOverflow {
        /// The lattice point whose bound broke.
        at: Location,
    },
    /// The connection graph acquired a cycle.
    ClosedLoop {
        /// Locations of the cells forming the loop.
        through: Vec<Location>,
    },
}

impl Display for Contradiction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegreeOverflow { at } => write!(f, "degree bound broken at {at}"),
            Self::ClosedLoop { through } => {
                write!(f, "loop closed through {} cells", through.len())
            }
        }
    }
}

impl std::error::Error for Contradiction {}

/// Outcome of a solver run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SolveStatus {
    /// Every cell is assigned and every invariant holds.
    Solved,
    /// The solver quiesced, was cancelled, or hit a top-level
    /// contradiction, with cells still undecided.
    Stalled,
}

/// Tuning knobs for a solver run.
#[derive(Clone, Debug, Default)]
pub struct SolveOptions {
    /// Enable the speculative connect trial between diagonally adjacent
    /// clues that each need exactly one more connection. Off by default.
    pub chain_trials: bool,
    /// Cooperative cancellation flag, polled only between work items.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// The two node kinds the outer queue dispatches on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum NodeRef {
    Vertex(VertexId),
    Edge(EdgeId),
}

pub(crate) struct Engine<'a> {
    board: &'a mut Board,
    options: SolveOptions,
    queue: VecDeque<NodeRef>,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(board: &'a mut Board, options: SolveOptions) -> Self {
        // clued-but-incomplete lattice points first, then undecided cells,
        // both in row-major order
        let mut queue = VecDeque::new();
        for y in 0..=board.height() {
            for x in 0..=board.width() {
                let v = board.vertex_id(x, y);
                if !board.vertex_is_solved(v) {
                    queue.push_back(NodeRef::Vertex(v));
                }
            }
        }
        for y in 0..board.height() {
            for x in 0..board.width() {
                let e = board.edge_id(x, y);
                if board.state(e).is_none() {
                    queue.push_back(NodeRef::Edge(e));
                }
            }
        }

        Self { board, options, queue }
    }

    fn cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub(crate) fn run(&mut self) -> SolveStatus {
        let mut since_progress = 0usize;
        let mut inconsistent = false;
        loop {
            if self.cancelled() {
                log::debug!("cancelled with {} nodes outstanding", self.queue.len());
                break;
            }
            let Some(node) = self.queue.pop_front() else {
                break;
            };
            if self.node_is_solved(node) {
                since_progress = 0;
                continue;
            }
            match self.solve_closure(node) {
                Ok(true) => since_progress = 0,
                Ok(false) => {
                    self.queue.push_back(node);
                    since_progress += 1;
                    // a full double pass without progress is quiescence
                    if since_progress == 2 * self.queue.len() {
                        log::debug!("quiescent with {} nodes outstanding", self.queue.len());
                        break;
                    }
                }
                Err(contradiction) => {
                    log::warn!("puzzle is inconsistent: {contradiction}");
                    inconsistent = true;
                    break;
                }
            }
        }

        if self.queue.is_empty() && !inconsistent {
            SolveStatus::Solved
        } else {
            SolveStatus::Stalled
        }
    }

    fn node_is_solved(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Vertex(v) => self.board.vertex_is_solved(v),
            NodeRef::Edge(e) => self.board.state(e).is_some(),
        }
    }

    /// Local closure around `seed`: drain an insertion-ordered set, most
    /// recently inserted first, feeding newly affected lattice points back
    /// in until nothing is left.
    fn solve_closure(&mut self, seed: NodeRef) -> Result<bool, Contradiction> {
        let mut work: IndexSet<NodeRef> = IndexSet::new();
        work.insert(seed);
        while let Some(node) = work.pop() {
            for affected in self.solve_node(node)? {
                work.insert(affected);
            }
        }
        Ok(self.node_is_solved(seed))
    }

    fn solve_node(&mut self, node: NodeRef) -> Result<Vec<NodeRef>, Contradiction> {
        match node {
            NodeRef::Vertex(v) => {
                let changes = rules::solve_vertex(self.board, v, self.options.chain_trials)?;
                Ok(self.affected_by(&changes))
            }
            NodeRef::Edge(e) => self.trial(e),
        }
    }

    /// The not-yet-solved lattice points touching each changed cell, in
    /// change order; the work set dedups on insert.
    fn affected_by(&self, changes: &[EdgeId]) -> Vec<NodeRef> {
        changes
            .iter()
            .flat_map(|&e| self.board.edge(e).vertices)
            .filter(|&v| !self.board.vertex_is_solved(v))
            .map(NodeRef::Vertex)
            .collect()
    }

    /// Speculatively run both orientations of an undecided cell. The first
    /// orientation whose exploration contradicts commits its opposite.
    fn trial(&mut self, e: EdgeId) -> Result<Vec<NodeRef>, Contradiction> {
        if self.board.state(e).is_some() {
            return Ok(Vec::new());
        }

        // recurse into the incident lattice points only when the log has
        // not moved since this cell's previous trial
        let deep = self.board.trial_guard(e);

        for &slash in Slash::VARIANTS {
            let mark = self.board.mark();
            match self.try_orientation(e, slash, deep) {
                Ok(()) => self.board.rollback_to(mark),
                Err(refuted) => {
                    let commit = self.board.state(e).unwrap().flip();
                    self.board.rollback_to(mark);
                    self.board.force(e, commit);
                    log::debug!("trial refuted: {refuted}");
                    return Ok(self.affected_by(&[e]));
                }
            }
        }

        Ok(Vec::new())
    }

    fn try_orientation(
        &mut self,
        e: EdgeId,
        slash: Slash,
        deep: bool,
    ) -> Result<(), Contradiction> {
        self.board.assign(e, slash)?;
        if deep {
            let incident = self.board.edge(e).vertices;
            for v in incident {
                if !self.board.vertex_is_solved(v) {
                    self.solve_closure(NodeRef::Vertex(v))?;
                }
            }
        }
        Ok(())
    }
}

impl Board {
    /// Solve in place with default options, applying deductions until
    /// quiescence. Returns whether the board ended up fully solved; the
    /// assignments made are on [`moves`](Board::moves).
    pub fn solve(&mut self) -> SolveStatus {
        self.solve_with(SolveOptions::default())
    }

    /// Solve in place with explicit [`SolveOptions`].
    pub fn solve_with(&mut self, options: SolveOptions) -> SolveStatus {
        Engine::new(self, options).run()
    }
}
