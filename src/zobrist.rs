//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position hashes, used both as the
//! transposition table key and the repetition-detection key.

use rand::prelude::*;
use rand::rngs::StdRng;
use std::sync::LazyLock;

use crate::types::{Color, Piece, Square};

struct ZobristKeys {
    /// `piece_keys[piece][color][square]`
    piece_keys: [[[u64; 64]; 2]; 6],
    black_to_move: u64,
    /// `castling_keys[color][side]`: side 0 = kingside, 1 = queenside.
    castling_keys: [[u64; 2]; 2],
    /// Indexed by file; only the file of an en-passant target square matters.
    en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed: two processes must derive identical hashes for the same
        // position, since hashes are never serialized across versions.
        let mut rng = StdRng::seed_from_u64(1_234_567_890_u64);
        let mut piece_keys = [[[0u64; 64]; 2]; 6];
        for piece in &mut piece_keys {
            for color in piece.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let black_to_move = rng.gen();
        let mut castling_keys = [[0u64; 2]; 2];
        for color in &mut castling_keys {
            for key in color.iter_mut() {
                *key = rng.gen();
            }
        }
        let mut en_passant_keys = [0u64; 8];
        for key in &mut en_passant_keys {
            *key = rng.gen();
        }
        ZobristKeys {
            piece_keys,
            black_to_move,
            castling_keys,
            en_passant_keys,
        }
    }
}

static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

#[inline]
pub fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    ZOBRIST.piece_keys[piece.index()][color.index()][sq.index()]
}

#[inline]
pub fn side_to_move_key() -> u64 {
    ZOBRIST.black_to_move
}

/// `side` 0 = kingside, 1 = queenside.
#[inline]
pub fn castling_key(color: Color, side: usize) -> u64 {
    ZOBRIST.castling_keys[color.index()][side]
}

#[inline]
pub fn en_passant_key(file: usize) -> u64 {
    ZOBRIST.en_passant_keys[file]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(
            piece_key(Color::White, Piece::Pawn, Square::new(1, 0)),
            piece_key(Color::White, Piece::Pawn, Square::new(1, 0))
        );
    }

    #[test]
    fn distinct_squares_give_distinct_keys() {
        assert_ne!(
            piece_key(Color::White, Piece::Pawn, Square::new(1, 0)),
            piece_key(Color::White, Piece::Pawn, Square::new(1, 1))
        );
    }
}
