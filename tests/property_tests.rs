//! Property-based tests for the two round-trip invariants in the testable
//! properties suite: make/unmake must restore a position bit-for-bit, and
//! the incrementally maintained Zobrist key must always agree with a
//! from-scratch recomputation. Random walks of pseudo-legal moves exercise
//! far more move-type combinations (castling mixed with captures mixed with
//! en passant) than a handful of hand-picked FENs ever would.

use proptest::prelude::*;

use mantissa_engine::movegen::generate_moves;
use mantissa_engine::position::Position;

/// A starting FEN plus, for each ply, an index used modulo the pseudo-legal
/// move count to pick which move to play. Out-of-range indices just wrap,
/// so any `u32` is a valid draw.
fn walk_strategy(max_plies: usize) -> impl Strategy<Value = (&'static str, Vec<u32>)> {
    let fens: Vec<&'static str> = vec![
        mantissa_engine::position::STARTPOS_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    ];
    (0..fens.len()).prop_flat_map(move |i| {
        (Just(fens[i]), proptest::collection::vec(any::<u32>(), 0..max_plies))
    })
}

proptest! {
    /// After making and immediately unmaking every pseudo-legal move reachable
    /// along a random walk, the position must match what it was before that
    /// move bit-for-bit: FEN text, hash, and the from-scratch hash recomputation.
    #[test]
    fn make_unmake_round_trips_along_random_walks((fen, picks) in walk_strategy(12)) {
        let mut pos = Position::from_fen(fen).unwrap();

        for pick in picks {
            let moves = generate_moves(&pos);
            if moves.is_empty() {
                break;
            }
            let m = moves[(pick as usize) % moves.len()];

            let before_fen = pos.to_fen();
            let before_hash = pos.hash;

            let undo = pos.make_move(m);
            let was_valid = undo.valid;
            pos.unmake_move(m, undo);

            prop_assert_eq!(pos.to_fen(), before_fen);
            prop_assert_eq!(pos.hash, before_hash);

            if !was_valid {
                // An invalid (self-check) move is never actually played forward;
                // stop this walk rather than continuing from a position the
                // search would never reach.
                break;
            }
            pos.make_move(m);
            prop_assert_eq!(pos.hash, pos.recompute_hash());
        }
    }

    /// The incrementally maintained Zobrist key must equal a from-scratch
    /// recomputation after every move played along a random walk, not just
    /// at the end of it.
    #[test]
    fn zobrist_key_matches_recomputation_at_every_ply((fen, picks) in walk_strategy(16)) {
        let mut pos = Position::from_fen(fen).unwrap();

        for pick in picks {
            let moves = generate_moves(&pos);
            if moves.is_empty() {
                break;
            }
            let m = moves[(pick as usize) % moves.len()];
            let undo = pos.make_move(m);
            if !undo.valid {
                pos.unmake_move(m, undo);
                break;
            }
            prop_assert_eq!(pos.hash, pos.recompute_hash());
        }
    }
}
