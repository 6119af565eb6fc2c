//! Transposition table: a flat, direct-mapped, always-replace cache of
//! search results keyed by Zobrist hash.

use crate::eval::MATE_SCORE;
use crate::position::Position;
use crate::types::Move;
use std::mem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
pub struct TTEntry {
    pub hash: u64,
    pub depth: i32,
    pub score: i32,
    pub bound: BoundType,
    pub best_move: Option<Move>,
}

/// What a probe found: a move to try first regardless of score usability,
/// and, separately, a score the caller may return outright if the bound
/// covers the requested window.
pub struct ProbeResult {
    pub best_move: Option<Move>,
    pub usable_score: Option<i32>,
}

pub struct TranspositionTable {
    table: Vec<Option<TTEntry>>,
    mask: usize,
}

impl TranspositionTable {
    pub fn new(size_mb: usize) -> Self {
        let entry_size = mem::size_of::<Option<TTEntry>>().max(1);
        let mut num_entries = (size_mb * 1024 * 1024) / entry_size;
        num_entries = num_entries.next_power_of_two();
        if num_entries == 0 {
            num_entries = 1024;
        }
        TranspositionTable {
            table: vec![None; num_entries],
            mask: num_entries - 1,
        }
    }

    pub fn resize(&mut self, size_mb: usize) {
        *self = TranspositionTable::new(size_mb);
    }

    pub fn clear(&mut self) {
        self.table.iter_mut().for_each(|e| *e = None);
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Probes for `hash` at `(alpha, beta, depth, ply)`. The best move, if
    /// any, is always returned for ordering; the score is only returned when
    /// the stored depth and bound actually cover the requested window.
    pub fn probe(&self, hash: u64, alpha: i32, beta: i32, depth: i32, ply: usize) -> ProbeResult {
        let Some(entry) = self.table[self.index(hash)].as_ref() else {
            return ProbeResult { best_move: None, usable_score: None };
        };
        if entry.hash != hash {
            return ProbeResult { best_move: None, usable_score: None };
        }
        let best_move = entry.best_move;
        if entry.depth < depth {
            return ProbeResult { best_move, usable_score: None };
        }
        let score = score_from_tt(entry.score, ply);
        let usable = match entry.bound {
            BoundType::Exact => Some(score),
            BoundType::Lower if score >= beta => Some(score),
            BoundType::Upper if score <= alpha => Some(score),
            _ => None,
        };
        ProbeResult { best_move, usable_score: usable }
    }

    /// Always overwrites whatever was stored at the hash's slot.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i32,
        score: i32,
        bound: BoundType,
        best_move: Option<Move>,
        ply: usize,
    ) {
        let index = self.index(hash);
        self.table[index] = Some(TTEntry {
            hash,
            depth,
            score: score_to_tt(score, ply),
            bound,
            best_move,
        });
    }

    /// Reconstructs the principal variation by repeatedly probing for the
    /// stored best move, playing it on a scratch position, and recursing
    /// until a TT miss or an illegal move text is hit.
    pub fn extract_pv(&self, root: &Position, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut pos = root.clone();
        for _ in 0..max_len {
            let Some(entry) = self.table[self.index(pos.hash)].as_ref() else {
                break;
            };
            if entry.hash != pos.hash {
                break;
            }
            let Some(m) = entry.best_move else { break };
            let undo = pos.make_move(m);
            if !undo.valid {
                pos.unmake_move(m, undo);
                break;
            }
            pv.push(m);
        }
        pv
    }
}

/// Mate scores are stored as "mate distance from this node", so a TT hit
/// several plies closer to or further from the root still reports a correct
/// distance-to-mate once adjusted back to the probing node's ply.
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_SCORE - 1000 {
        score + ply as i32
    } else if score < -MATE_SCORE + 1000 {
        score - ply as i32
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_SCORE - 1000 {
        score - ply as i32
    } else if score < -MATE_SCORE + 1000 {
        score + ply as i32
    } else {
        score
    }
}
