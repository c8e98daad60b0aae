//! Local deduction rules applied at a single clued lattice point.
//!
//! Every rule either assigns nothing or assigns forced orientations to
//! cells around the point under examination; the caller schedules the
//! lattice points those cells touch. Saturation runs first; the
//! directional rules only run when saturation finds nothing; the
//! speculative chain trial only runs when everything else found nothing.

use itertools::Itertools;
use strum::VariantArray;

use crate::board::Board;
use crate::cell::{
    anti_slash, connect_slash, diagonal_slot, edge_pair, EdgeId, Location, Slash, VertexId,
};
use crate::solver::Contradiction;
use crate::step::Compass;

/// What a chain walk found at its terminating lattice point.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum ChainAction {
    None,
    /// Apply the pair relation at the originating point, on its far side.
    ParallelSelf,
    /// Apply the pair relation at both ends of the chain.
    ParallelBoth,
}

/// Run every applicable rule at `v` once, returning the cells assigned.
pub(crate) fn solve_vertex(
    board: &mut Board,
    v: VertexId,
    chain_trials: bool,
) -> Result<Vec<EdgeId>, Contradiction> {
    if board.vertex_is_solved(v) {
        return Ok(Vec::new());
    }

    let mut changes = satisfy(board, v)?;
    if !changes.is_empty() {
        return Ok(changes);
    }

    let Location(x, y) = board.vertex(v).loc;
    let (w, h) = (board.width(), board.height());

    for &dir in Compass::VARIANTS {
        let (dx, dy) = dir.offsets();
        // no cells on the far side of a boundary
        if ((x == 0 || x == w) && dx == 0) || ((y == 0 || y == h) && dy == 0) {
            continue;
        }

        match board.adjacent_vertex(v, dx, dy) {
            Some(ov) => {
                if dir.is_diagonal() {
                    // two diagonally adjacent interior 1-clues can never
                    // connect to each other
                    if board.clue(v) == Some(1)
                        && board.clue(ov) == Some(1)
                        && board.vertex_is_interior(v)
                        && board.vertex_is_interior(ov)
                    {
                        let slot = diagonal_slot(dx, dy);
                        let e = board.vertex_edge(v, slot);
                        if board.state(e).is_none() {
                            board.assign(e, anti_slash(slot))?;
                            changes.push(e);
                        }
                    }
                } else if is_parallel(board, v, -dx, -dy) {
                    // the decided pair behind v carries its relation
                    // straight across to the next lattice point
                    changes.extend(parallel(board, ov, dx, dy)?);
                } else {
                    // walk through consecutive 2-clues until some lattice
                    // point pins the relation down
                    let mut cursor = ov;
                    let mut fell_off = false;
                    while board.clue(cursor) == Some(2)
                        && interesting_node(board, v, cursor, dx, dy) == ChainAction::None
                    {
                        match board.adjacent_vertex(cursor, dx, dy) {
                            Some(next) => cursor = next,
                            None => {
                                fell_off = true;
                                break;
                            }
                        }
                    }

                    if fell_off {
                        changes.extend(reflect_off_grid(board, v, dx, dy)?);
                    } else {
                        match interesting_node(board, v, cursor, dx, dy) {
                            ChainAction::ParallelSelf => {
                                changes.extend(parallel(board, v, -dx, -dy)?);
                            }
                            ChainAction::ParallelBoth => {
                                changes.extend(parallel(board, cursor, dx, dy)?);
                                changes.extend(parallel(board, v, -dx, -dy)?);
                            }
                            ChainAction::None => {}
                        }
                    }
                }
            }
            None => {
                if dir.is_diagonal() {
                    continue;
                }
                changes.extend(reflect_off_grid(board, v, dx, dy)?);
            }
        }
    }

    if chain_trials && changes.is_empty() && board.vertex_is_interior(v) {
        changes.extend(chain_trial(board, v));
    }

    Ok(changes)
}

/// Saturation: once a clue is met, the rest of its cells point away; once
/// its complement is met, the rest connect.
pub(crate) fn satisfy(board: &mut Board, v: VertexId) -> Result<Vec<EdgeId>, Contradiction> {
    let mut changes = Vec::new();
    let Some(d) = board.clue(v) else {
        return Ok(changes);
    };

    if board.degree(v) == d as usize {
        for (slot, e) in board.unsolved_edges(v).collect_vec() {
            board.assign(e, anti_slash(slot))?;
            changes.push(e);
        }
    } else if board.antidegree(v) == 4 - d as usize {
        for (slot, e) in board.unsolved_edges(v).collect_vec() {
            board.assign(e, connect_slash(slot))?;
            changes.push(e);
        }
    }

    Ok(changes)
}

/// Whether the pair of cells on the `(dx, dy)` side of `v` is decided and
/// consistent with `v`'s clue: differing orientations for 1 and 3, equal
/// for 2.
fn is_parallel(board: &Board, v: VertexId, dx: isize, dy: isize) -> bool {
    let (s1, s2) = edge_pair(dx, dy);
    let e1 = board.state(board.vertex_edge(v, s1));
    let e2 = board.state(board.vertex_edge(v, s2));
    match (board.clue(v), e1, e2) {
        (Some(1 | 3), Some(a), Some(b)) => a != b,
        (Some(2), Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Enforce the pair relation on the `(dx, dy)` side of `v`: a 1 takes
/// neither of the pair, a 3 takes both, and a 2 equalizes the pair and
/// pushes the relation one lattice point further along.
fn parallel(
    board: &mut Board,
    v: VertexId,
    dx: isize,
    dy: isize,
) -> Result<Vec<EdgeId>, Contradiction> {
    let mut changed = Vec::new();
    let (s1, s2) = edge_pair(dx, dy);

    match board.clue(v) {
        Some(d @ (1 | 3)) => {
            for slot in [s1, s2] {
                let e = board.vertex_edge(v, slot);
                if board.state(e).is_none() {
                    let slash = if d == 1 { anti_slash(slot) } else { connect_slash(slot) };
                    board.assign(e, slash)?;
                    changed.push(e);
                }
            }
        }
        Some(2) => {
            let e1 = board.vertex_edge(v, s1);
            let e2 = board.vertex_edge(v, s2);
            match (board.state(e1), board.state(e2)) {
                (Some(s), None) => {
                    board.assign(e2, s)?;
                    changed.push(e2);
                }
                (None, Some(s)) => {
                    board.assign(e1, s)?;
                    changed.push(e1);
                }
                _ => {}
            }

            if let Some(next) = board.adjacent_vertex(v, dx, dy) {
                changed.extend(parallel(board, next, dx, dy)?);
            }
        }
        _ => {}
    }

    Ok(changed)
}

/// Decide whether the lattice point `w`, reached by walking `(dx, dy)` from
/// `v`, lets the pair relation fire, and at which end.
fn interesting_node(board: &Board, v: VertexId, w: VertexId, dx: isize, dy: isize) -> ChainAction {
    if is_parallel(board, w, dx, dy) {
        return ChainAction::ParallelSelf;
    }

    let vd = board.clue(v);
    let wd = board.clue(w);
    if let Some(d @ (1 | 3)) = vd {
        // a matching clue ends the chain, as does a 2 whose far pair
        // already contains the orientation the relation at v dictates
        let (a1, a2) = edge_pair(dx, dy);
        let pinned_two = wd == Some(2)
            && [a1, a2].iter().any(|&slot| {
                let wanted = if d == 1 { connect_slash(slot) } else { anti_slash(slot) };
                board.state(board.vertex_edge(w, slot)) == Some(wanted)
            });
        if wd == Some(d) || pinned_two {
            return ChainAction::ParallelBoth;
        }
    } else if vd == Some(2) && wd == Some(2) {
        let (b1, b2) = edge_pair(-dx, -dy);
        let e1 = board.state(board.vertex_edge(v, b1));
        let e2 = board.state(board.vertex_edge(v, b2));
        let (a1, a2) = edge_pair(dx, dy);
        let w1 = board.state(board.vertex_edge(w, a1));
        let w2 = board.state(board.vertex_edge(w, a2));
        // half-known pair at v whose states cross-match or cross-invert
        // the pair at w
        if (e1.is_some() ^ e2.is_some())
            && ((e1 == w2 && e2 == w1)
                || (e1 == w1.map(Slash::flip) && e2 == w2.map(Slash::flip)))
        {
            return ChainAction::ParallelBoth;
        }
    }

    ChainAction::None
}

/// A cardinal walk from a 1-clue fell off the board: the relation reflects
/// back inward.
fn reflect_off_grid(
    board: &mut Board,
    v: VertexId,
    dx: isize,
    dy: isize,
) -> Result<Vec<EdgeId>, Contradiction> {
    if board.clue(v) != Some(1) {
        return Ok(Vec::new());
    }
    let (rdx, rdy) = (-dx, -dy);
    match board.adjacent_vertex(v, rdx, rdy) {
        Some(inner) => parallel(board, inner, rdx, rdy),
        None => Ok(Vec::new()),
    }
}

/// Speculative connect between diagonally adjacent clues that each need
/// exactly one more connection: try it, propagate saturation at both ends,
/// and commit the opposite orientation if that contradicts.
fn chain_trial(board: &mut Board, v: VertexId) -> Vec<EdgeId> {
    let mut changes = Vec::new();

    for dir in Compass::DIAGONALS {
        let (dx, dy) = dir.offsets();
        let Some(ov) = board.adjacent_vertex(v, dx, dy) else {
            continue;
        };
        let slot = diagonal_slot(dx, dy);
        let e = board.vertex_edge(v, slot);

        if board.state(e).is_some()
            || board.clue(ov).is_none()
            || !board.vertex_is_interior(ov)
            || board.clue(v).map(usize::from) != Some(board.degree(v) + 1)
            || board.clue(ov).map(usize::from) != Some(board.degree(ov) + 1)
        {
            continue;
        }

        // only burn a trial once the log has stopped moving
        if !board.trial_guard(e) {
            continue;
        }

        let mark = board.mark();
        match try_connect(board, e, slot, v, ov) {
            Ok(()) => board.rollback_to(mark),
            Err(refuted) => {
                let commit = board.state(e).unwrap().flip();
                board.rollback_to(mark);
                board.force(e, commit);
                log::debug!("chain trial refuted {refuted}; committed the opposite");
                changes.push(e);
            }
        }
    }

    changes
}

fn try_connect(
    board: &mut Board,
    e: EdgeId,
    slot: usize,
    v: VertexId,
    ov: VertexId,
) -> Result<(), Contradiction> {
    board.assign(e, connect_slash(slot))?;
    satisfy(board, v)?;
    satisfy(board, ov)?;
    Ok(())
}
