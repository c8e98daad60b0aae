#[cfg(test)]
mod tests {
    use std::num::NonZero;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::board::Board;
    use crate::builder::{BuilderInvalidReason, SlantBoardBuilder};
    use crate::cell::{Dimension, Location, Slash};
    use crate::rules;
    use crate::solver::{Contradiction, SolveOptions, SolveStatus};

    fn dims(w: usize, h: usize) -> (Dimension, Dimension) {
        (NonZero::new(w).unwrap(), NonZero::new(h).unwrap())
    }

    fn board_from(w: usize, h: usize, desc: &str) -> Board {
        SlantBoardBuilder::from_desc(dims(w, h), desc).build().unwrap()
    }

    #[test]
    fn builder_rejects_out_of_bounds_clue() {
        let mut builder = SlantBoardBuilder::with_dims(dims(3, 3));
        builder.add_clue(Location(9, 9), 1);

        assert_eq!(
            builder.is_valid(),
            Some(&vec![BuilderInvalidReason::FeatureOutOfBounds])
        );
        assert!(builder.build().is_err());
    }

    #[test]
    fn builder_rejects_bad_descriptions() {
        let mut too_high = SlantBoardBuilder::with_dims(dims(3, 3));
        too_high.parse_desc("7");
        assert_eq!(
            too_high.is_valid(),
            Some(&vec![BuilderInvalidReason::ClueOutOfRange])
        );

        let mut junk = SlantBoardBuilder::with_dims(dims(3, 3));
        junk.parse_desc("0!");
        assert_eq!(
            junk.is_valid(),
            Some(&vec![BuilderInvalidReason::MalformedDescription])
        );
    }

    #[test]
    fn description_round_trips() {
        let desc = "d0a1c2d3e1f2g";
        let board = board_from(5, 5, desc);

        assert_eq!(board.clue_at(Location(4, 0)), Some(0));
        assert_eq!(board.clue_at(Location(0, 1)), Some(1));
        assert_eq!(board.clue_at(Location(0, 0)), None);
        assert_eq!(board.desc(), desc);
    }

    #[test]
    fn corner_ones_solve_a_two_by_two() {
        let mut board = board_from(2, 2, "1a1c1a1");

        assert_eq!(
            format!("{board}"),
            "1─┬─1
│ │ │
├─┼─┤
│ │ │
1─┴─1
"
        );

        assert_eq!(board.solve(), SolveStatus::Solved);
        assert!(board.is_solved());
        assert_eq!(board.moves().count(), 4);
        assert_eq!(
            format!("{board}"),
            "1─┬─1
│╲│╱│
├─┼─┤
│╱│╲│
1─┴─1
"
        );
    }

    #[test]
    fn corner_zero_forces_the_first_move() {
        let mut board = board_from(3, 3, "0o");
        board.solve();

        assert_eq!(board.moves().next(), Some((Slash::Forward, Location(0, 0))));
    }

    #[test]
    fn center_two_forces_both_back_diagonals() {
        // the zeroed corners pin cells (1, 0) and (0, 1) away from the
        // center of the 2x2, so the 2-clue at (1, 1) saturates and must
        // take both back-diagonal cells, (0, 0) and (1, 1)
        let mut board = board_from(2, 2, "b0a2a0b");

        assert_eq!(board.solve(), SolveStatus::Solved);
        assert_eq!(board.slash_at(Location(0, 0)), Some(Slash::Back));
        assert_eq!(board.slash_at(Location(1, 1)), Some(Slash::Back));
        // and the remaining cells took their forced orientations without
        // closing a loop
        assert_eq!(board.slash_at(Location(1, 0)), Some(Slash::Back));
        assert_eq!(board.slash_at(Location(0, 1)), Some(Slash::Back));
        assert!(board.is_solved());
    }

    #[test]
    fn boundary_two_saturates_both_cells() {
        let mut board = board_from(2, 2, "a2g");
        board.solve();

        let moves: Vec<_> = board.moves().collect();
        assert_eq!(moves[0], (Slash::Forward, Location(0, 0)));
        assert_eq!(moves[1], (Slash::Back, Location(1, 0)));
    }

    #[test]
    fn adjacent_diagonal_ones_exclude_the_shared_cell() {
        let mut board = board_from(3, 3, "e1d1e");
        board.solve();

        assert_eq!(board.moves().next(), Some((Slash::Forward, Location(1, 1))));
        assert_eq!(board.slash_at(Location(1, 1)), Some(Slash::Forward));
    }

    #[test_log::test]
    fn clue_complete_grid_cascades_to_a_full_solution() {
        let mut board = board_from(3, 3, "1011122112210210");

        assert_eq!(board.solve(), SolveStatus::Solved);
        assert!(board.is_solved());
        assert_eq!(board.moves().count(), 9);
        for y in 0..3 {
            assert_eq!(board.slash_at(Location(0, y)), Some(Slash::Back));
            assert_eq!(board.slash_at(Location(1, y)), Some(Slash::Forward));
            assert_eq!(board.slash_at(Location(2, y)), Some(Slash::Forward));
        }

        let graph = board.connection_graph();
        assert_eq!(graph.node_count(), 16);
        assert_eq!(graph.edge_count(), 9);
        assert!(!petgraph::algo::is_cyclic_undirected(&graph));
    }

    #[test]
    fn identical_input_produces_identical_move_logs() {
        let mut first = board_from(3, 3, "1011122112210210");
        let mut second = board_from(3, 3, "1011122112210210");
        first.solve();
        second.solve();

        assert_eq!(first.move_strings(), second.move_strings());
    }

    #[test]
    fn solving_a_solved_board_is_a_noop() {
        let mut board = board_from(3, 3, "1011122112210210");
        board.solve();
        let log = board.move_strings();

        assert_eq!(board.solve(), SolveStatus::Solved);
        assert_eq!(board.move_strings(), log);
    }

    #[test]
    fn chain_trials_do_not_disturb_a_forced_solve() {
        let mut board = board_from(3, 3, "1011122112210210");
        let status = board.solve_with(SolveOptions {
            chain_trials: true,
            ..Default::default()
        });

        assert_eq!(status, SolveStatus::Solved);
        assert!(board.is_solved());
    }

    #[test]
    fn rollback_restores_the_store_to_the_mark() {
        let mut board = board_from(3, 3, "p");

        let mark = board.mark();
        board.assign(board.edge_id(0, 0), Slash::Forward).unwrap();
        board.assign(board.edge_id(2, 1), Slash::Back).unwrap();
        assert_eq!(board.slash_at(Location(0, 0)), Some(Slash::Forward));
        assert_eq!(board.slash_at(Location(2, 1)), Some(Slash::Back));
        assert_eq!(board.mark(), mark + 2);

        board.rollback_to(mark);
        assert_eq!(board.slash_at(Location(0, 0)), None);
        assert_eq!(board.slash_at(Location(2, 1)), None);
        assert_eq!(board.mark(), mark);
    }

    #[test]
    fn sentinels_count_toward_antidegree_only() {
        let board = board_from(3, 3, "p");

        assert_eq!(board.antidegree(board.vertex_id(0, 0)), 3);
        assert_eq!(board.antidegree(board.vertex_id(1, 0)), 2);
        assert_eq!(board.antidegree(board.vertex_id(1, 1)), 0);
        assert_eq!(board.degree(board.vertex_id(0, 0)), 0);
    }

    #[test]
    fn traverse_follows_the_slash_pairing() {
        let mut board = board_from(3, 3, "p");
        let e = board.edge_id(1, 1);

        assert!(board.endpoints(e).is_none());

        board.assign(e, Slash::Back).unwrap();
        assert_eq!(board.traverse(e, board.vertex_id(1, 1)), Some(board.vertex_id(2, 2)));
        assert_eq!(board.traverse(e, board.vertex_id(2, 2)), Some(board.vertex_id(1, 1)));
        assert_eq!(board.traverse(e, board.vertex_id(2, 1)), None);
    }

    #[test]
    fn closing_a_loop_is_a_contradiction() {
        let mut board = SlantBoardBuilder::from_desc(dims(2, 2), "i")
            .add_move(Location(0, 0), Slash::Forward)
            .add_move(Location(1, 0), Slash::Back)
            .add_move(Location(0, 1), Slash::Back)
            .build()
            .unwrap();

        assert_eq!(board.find_cycle(board.vertex_id(1, 0)), None);

        let result = board.assign(board.edge_id(1, 1), Slash::Forward);
        assert!(matches!(result, Err(Contradiction::ClosedLoop { ref through }) if through.len() == 4));
    }

    #[test]
    fn trial_commits_the_opposite_of_a_loop_closer() {
        let mut board = SlantBoardBuilder::from_desc(dims(2, 2), "i")
            .add_move(Location(0, 0), Slash::Forward)
            .add_move(Location(1, 0), Slash::Back)
            .add_move(Location(0, 1), Slash::Back)
            .build()
            .unwrap();

        assert_eq!(board.solve(), SolveStatus::Solved);
        assert_eq!(board.slash_at(Location(1, 1)), Some(Slash::Back));
        assert_eq!(board.move_strings(), ["/0,0", "\\1,0", "\\0,1", "\\1,1"]);
        assert_eq!(
            format!("{board}"),
            "┌─┬─┐
│╱│╲│
├─┼─┤
│╲│╲│
└─┴─┘
"
        );
    }

    #[test]
    fn clueless_board_stalls_without_moves() {
        let mut board = board_from(2, 2, "i");

        assert_eq!(board.solve(), SolveStatus::Stalled);
        assert_eq!(board.moves().count(), 0);
        assert!(board.grid().iter().all(Option::is_none));
    }

    #[test_log::test]
    fn chain_trial_commits_the_refuted_opposite() {
        let mut board = SlantBoardBuilder::from_desc(dims(3, 3), "e2d2b2b")
            .add_move(Location(1, 0), Slash::Forward)
            .add_move(Location(2, 1), Slash::Forward)
            .build()
            .unwrap();
        let v = board.vertex_id(1, 1);

        // first visit records the log snapshot and stays quiet
        let first = rules::solve_vertex(&mut board, v, true).unwrap();
        assert!(first.is_empty());

        // unchanged log, so the trial runs: connecting (1,1)-(2,2) forces
        // an anti edge into the 2-clue at (1,3), which overflows
        let second = rules::solve_vertex(&mut board, v, true).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(board.slash_at(Location(1, 1)), Some(Slash::Forward));

        // the hypothesis itself was rolled back
        assert_eq!(board.slash_at(Location(0, 0)), None);
        assert_eq!(board.slash_at(Location(0, 1)), None);
        assert_eq!(board.mark(), 3);
    }

    #[test]
    fn parallel_relation_transports_down_a_chain_of_twos() {
        let mut board = SlantBoardBuilder::from_desc(dims(4, 2), "f222f")
            .add_move(Location(0, 0), Slash::Forward)
            .add_move(Location(0, 1), Slash::Forward)
            .add_move(Location(3, 0), Slash::Back)
            .build()
            .unwrap();
        board.solve();

        assert_eq!(board.slash_at(Location(3, 1)), Some(Slash::Back));
    }

    #[test]
    fn cancellation_stops_at_the_queue_boundary() {
        let flag = Arc::new(AtomicBool::new(false));
        flag.store(true, Ordering::Relaxed);

        // without cancellation this board would at least force (0, 0)
        let mut board = board_from(3, 3, "0o");
        let status = board.solve_with(SolveOptions {
            chain_trials: false,
            cancel: Some(flag),
        });

        assert_eq!(status, SolveStatus::Stalled);
        assert_eq!(board.moves().count(), 0);
    }
}
