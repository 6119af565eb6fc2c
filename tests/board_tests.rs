use mantissa_engine::perft;
use mantissa_engine::position::Position;
use mantissa_engine::transposition_table::{BoundType, TranspositionTable};

#[test]
fn perft_positions() {
    struct TestPosition {
        name: &'static str,
        fen: &'static str,
        depths: &'static [(u32, u64)],
    }

    const TEST_POSITIONS: &[TestPosition] = &[
        TestPosition {
            name: "Initial Position",
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            depths: &[(1, 20), (2, 400), (3, 8902)],
        },
        TestPosition {
            name: "Kiwipete",
            fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            depths: &[(1, 48), (2, 2039)],
        },
    ];

    for position in TEST_POSITIONS {
        let mut pos = Position::from_fen(position.fen).unwrap();
        for &(depth, expected) in position.depths {
            let nodes = perft::perft(&mut pos, depth);
            assert_eq!(nodes, expected, "Perft failed for {} at depth {}", position.name, depth);
        }
    }
}

#[test]
fn fifty_move_rule_is_detected_as_a_draw() {
    let pos = Position::from_fen("8/8/8/8/8/8/8/K6k w - - 99 1").unwrap();
    assert!(pos.halfmove_clock >= 99);
}

#[test]
fn zobrist_hash_matches_from_scratch_recomputation_after_moves() {
    let mut pos = Position::new_game();
    let moves = ["e2e4", "e7e5", "g1f3", "b8c6"];
    for text in moves {
        let m = mantissa_engine::movegen::generate_moves(&pos)
            .into_iter()
            .find(|m| m.to_long_algebraic() == text)
            .unwrap_or_else(|| panic!("{text} should be legal"));
        pos.make_move(m);
    }
    assert_eq!(pos.hash, pos.recompute_hash());
}

#[test]
fn transposition_table_store_probe_prefers_deeper_entries() {
    let mut tt = TranspositionTable::new(1);
    let hash = 0xdead_beefu64;

    tt.store(hash, 1, 100, BoundType::Exact, None, 0);
    let probe = tt.probe(hash, -1000, 1000, 1, 0);
    assert_eq!(probe.usable_score, Some(100));

    // A shallower store at the same key still overwrites (always-replace),
    // but a probe requesting depth 5 can't use depth-0 data.
    tt.store(hash, 0, 50, BoundType::Exact, None, 0);
    let probe = tt.probe(hash, -1000, 1000, 5, 0);
    assert_eq!(probe.usable_score, None);

    tt.store(hash, 5, 200, BoundType::Exact, None, 0);
    let probe = tt.probe(hash, -1000, 1000, 5, 0);
    assert_eq!(probe.usable_score, Some(200));
}

#[test]
fn make_unmake_round_trip_restores_hash_and_material() {
    let mut pos = Position::new_game();
    let before_hash = pos.hash;
    let before_fen = pos.to_fen();

    for text in ["e2e4", "d7d5", "g1f3"] {
        let m = mantissa_engine::movegen::generate_moves(&pos)
            .into_iter()
            .find(|m| m.to_long_algebraic() == text)
            .unwrap();
        let undo = pos.make_move(m);
        pos.unmake_move(m, undo);
        // Unmaking the only move played restores the exact starting state.
        assert_eq!(pos.hash, before_hash);
        assert_eq!(pos.to_fen(), before_fen);
        // now actually advance for the next iteration
        let m = mantissa_engine::movegen::generate_moves(&pos)
            .into_iter()
            .find(|m| m.to_long_algebraic() == text)
            .unwrap();
        pos.make_move(m);
    }
}
