//! Magic-bitboard sliding attacks for rooks and bishops.
//!
//! Each square gets a "relevant occupancy" mask (the ray squares that can
//! possibly block its slider, excluding the trailing edge square on each ray
//! since nothing ever blocks past it), a 64-bit magic multiplier, and a shift.
//! `(occupied & mask).wrapping_mul(magic) >> shift` indexes a small flat table
//! of precomputed attack sets. The magics themselves are found once, at
//! process startup, by randomized search validated against the scanning
//! reference generator in `bitboard.rs`.

use crate::bitboard::{bishop_attacks_scan, popcount, rook_attacks_scan};
use crate::types::Square;
use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;
use std::sync::LazyLock;

const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// A found-once-at-startup magic entry for a single square.
struct MagicEntry {
    mask: u64,
    magic: u64,
    shift: u32,
    offset: usize,
}

pub struct MagicTables {
    rook_magics: [MagicEntry; 64],
    bishop_magics: [MagicEntry; 64],
    rook_table: Vec<u64>,
    bishop_table: Vec<u64>,
}

pub static MAGICS: LazyLock<MagicTables> = LazyLock::new(build_magic_tables);

impl MagicTables {
    #[inline]
    pub fn rook_attacks(&self, sq: Square, occupied: u64) -> u64 {
        let entry = &self.rook_magics[sq.index()];
        let idx = index_for(entry, occupied);
        self.rook_table[entry.offset + idx]
    }

    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occupied: u64) -> u64 {
        let entry = &self.bishop_magics[sq.index()];
        let idx = index_for(entry, occupied);
        self.bishop_table[entry.offset + idx]
    }

    #[inline]
    pub fn queen_attacks(&self, sq: Square, occupied: u64) -> u64 {
        self.rook_attacks(sq, occupied) | self.bishop_attacks(sq, occupied)
    }
}

#[inline]
fn index_for(entry: &MagicEntry, occupied: u64) -> usize {
    let relevant = occupied & entry.mask;
    (relevant.wrapping_mul(entry.magic) >> entry.shift) as usize
}

pub fn rook_attacks(sq: Square, occupied: u64) -> u64 {
    MAGICS.rook_attacks(sq, occupied)
}

pub fn bishop_attacks(sq: Square, occupied: u64) -> u64 {
    MAGICS.bishop_attacks(sq, occupied)
}

pub fn queen_attacks(sq: Square, occupied: u64) -> u64 {
    MAGICS.queen_attacks(sq, occupied)
}

fn sliding_mask(sq: Square, dirs: &[(i32, i32)]) -> u64 {
    let rank = sq.rank() as i32;
    let file = sq.file() as i32;
    let mut mask = 0u64;
    for &(dr, df) in dirs {
        let mut r = rank + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let nr = r + dr;
            let nf = f + df;
            if (0..8).contains(&nr) && (0..8).contains(&nf) {
                mask |= Square::new(r as usize, f as usize).bit();
            }
            r += dr;
            f += df;
        }
    }
    mask
}

/// Enumerate every subset of `mask`'s set bits via the carry-rippler trick.
fn subsets_of(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1usize << popcount(mask));
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        if subset == mask {
            break;
        }
        subset = (subset.wrapping_sub(mask)) & mask;
    }
    subsets
}

/// Searches for a magic number that maps every blocker subset of `mask` to a
/// collision-free slot, building the attack table for one square as a side
/// effect. Candidates are sparse 64-bit values (AND of three random words),
/// which empirically yield usable magics far more often than uniform random
/// 64-bit numbers.
fn find_magic_for_square(
    sq: Square,
    dirs: &[(i32, i32)],
    scan: fn(Square, u64) -> u64,
    rng: &mut StdRng,
) -> (u64, u32, Vec<u64>) {
    let mask = sliding_mask(sq, dirs);
    let bits = popcount(mask);
    let shift = 64 - bits;
    let occupancies = subsets_of(mask);
    let reference: Vec<u64> = occupancies.iter().map(|&occ| scan(sq, occ)).collect();

    loop {
        let magic = sparse_random(rng);
        if popcount(mask.wrapping_mul(magic) & 0xff00_0000_0000_0000) < 6 {
            continue;
        }
        let mut table = vec![u64::MAX; 1usize << bits];
        let mut valid = true;
        for (i, &occ) in occupancies.iter().enumerate() {
            let idx = ((occ.wrapping_mul(magic)) >> shift) as usize;
            let attack = reference[i];
            if table[idx] == u64::MAX {
                table[idx] = attack;
            } else if table[idx] != attack {
                valid = false;
                break;
            }
        }
        if valid {
            return (magic, shift, table);
        }
    }
}

#[inline]
fn sparse_random(rng: &mut StdRng) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

fn build_magic_tables() -> MagicTables {
    // Fixed seed: magic numbers must be reproducible across runs (and across
    // machines) so that two processes searching the same FEN build identical
    // attack tables.
    let mut rng = StdRng::seed_from_u64(0x5EED_B17B_0A4D_u64);

    let mut rook_table = Vec::new();
    let mut bishop_table = Vec::new();
    let rook_magics: [MagicEntry; 64] = std::array::from_fn(|i| {
        let sq = Square(i as u8);
        let (magic, shift, table) = find_magic_for_square(sq, &ROOK_DIRS, rook_attacks_scan, &mut rng);
        let offset = rook_table.len();
        rook_table.extend_from_slice(&table);
        MagicEntry {
            mask: sliding_mask(sq, &ROOK_DIRS),
            magic,
            shift,
            offset,
        }
    });
    let bishop_magics: [MagicEntry; 64] = std::array::from_fn(|i| {
        let sq = Square(i as u8);
        let (magic, shift, table) =
            find_magic_for_square(sq, &BISHOP_DIRS, bishop_attacks_scan, &mut rng);
        let offset = bishop_table.len();
        bishop_table.extend_from_slice(&table);
        MagicEntry {
            mask: sliding_mask(sq, &BISHOP_DIRS),
            magic,
            shift,
            offset,
        }
    });

    MagicTables {
        rook_magics,
        bishop_magics,
        rook_table,
        bishop_table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_attacks_match_scan_reference() {
        let d4 = Square::new(3, 3);
        let blockers = Square::new(3, 5).bit() | Square::new(5, 3).bit();
        assert_eq!(
            MAGICS.rook_attacks(d4, blockers),
            rook_attacks_scan(d4, blockers)
        );
    }

    #[test]
    fn bishop_attacks_match_scan_reference() {
        let d4 = Square::new(3, 3);
        let blockers = Square::new(5, 5).bit();
        assert_eq!(
            MAGICS.bishop_attacks(d4, blockers),
            bishop_attacks_scan(d4, blockers)
        );
    }

    #[test]
    fn empty_board_rook_attacks_from_a1() {
        let a1 = Square::new(0, 0);
        let expected = rook_attacks_scan(a1, 0);
        assert_eq!(MAGICS.rook_attacks(a1, 0), expected);
    }

    #[test]
    fn tables_are_deterministic_across_calls() {
        let h8 = Square::new(7, 7);
        let occ = Square::new(4, 4).bit();
        let first = MAGICS.queen_attacks(h8, occ);
        let second = MAGICS.queen_attacks(h8, occ);
        assert_eq!(first, second);
    }
}
