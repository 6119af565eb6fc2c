//! Iterative deepening: the outer driver that repeatedly re-runs alpha-beta
//! at increasing depth, adopting each completed iteration's result and
//! reporting progress over the UCI info channel.

use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::eval::MATE_SCORE;
use crate::movegen::generate_moves;
use crate::ordering::OrderingContext;
use crate::position::Position;
use crate::search::alpha_beta::alpha_beta;
use crate::search::{SearchContext, SearchControl, MAX_DEPTH};
use crate::sync::StopFlag;
use crate::transposition_table::TranspositionTable;
use crate::types::Move;
use crate::uci_info::Info;

/// A mate score within this margin of `MATE_SCORE` is "found mate"; the
/// iterative loop stops deepening once a line this strong is confirmed,
/// matching the TT's own mate-adjustment threshold.
const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;

pub struct SearchOptions {
    /// Depth limit; defaults to `MAX_DEPTH` when the caller gives none.
    pub max_depth: i32,
    /// `None` means unbounded (search only stops at depth limit or `stop`).
    pub move_time: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_depth: MAX_DEPTH as i32 - 1,
            move_time: None,
        }
    }
}

pub struct SearchOutcome {
    pub best_move: Move,
    pub score: i32,
    pub depth: i32,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

/// Runs iterative deepening to `options.max_depth` or until `stop_flag` is
/// set or `options.move_time` elapses. Always returns a move: on a
/// pathological first-iteration stop, falls back to the first legal move
/// from a fresh move generation.
pub fn iterative_deepening(
    pos: &mut Position,
    tt: &mut TranspositionTable,
    ordering: &mut OrderingContext,
    stop_flag: StopFlag,
    options: SearchOptions,
    info_sender: Option<&Sender<Info>>,
) -> SearchOutcome {
    let mut control = SearchControl::new(stop_flag, options.move_time);
    let mut ctx = SearchContext { tt, ordering, control: &mut control };

    let mut best_move: Option<Move> = None;
    let mut best_score = 0;
    let mut best_depth = 0;
    let mut best_pv: Vec<Move> = Vec::new();

    for depth in 1..=options.max_depth {
        let score = alpha_beta(pos, &mut ctx, -MATE_SCORE - 1, MATE_SCORE + 1, depth, 0, true);

        if ctx.control.is_stopped() {
            break;
        }

        let pv = ctx.tt.extract_pv(pos, depth as usize);
        if let Some(&first) = pv.first() {
            best_move = Some(first);
            best_score = score;
            best_depth = depth;
            best_pv = pv;

            if let Some(sender) = info_sender {
                let info = Info {
                    depth: depth as u32,
                    score_cp: score,
                    nodes: ctx.control.nodes,
                    time_ms: ctx.control.elapsed_ms(),
                    pv: best_pv.iter().map(|m| m.to_long_algebraic()).collect(),
                };
                let _ = sender.send(info);
            }
        }

        if score.abs() > MATE_THRESHOLD {
            break;
        }
    }

    let best_move = best_move.unwrap_or_else(|| fallback_legal_move(pos));

    SearchOutcome {
        best_move,
        score: best_score,
        depth: best_depth,
        nodes: control.nodes,
        pv: best_pv,
    }
}

/// Picks the first pseudo-legal move that doesn't leave the mover in check,
/// for the pathological case where iterative deepening stopped before
/// completing even depth 1.
fn fallback_legal_move(pos: &mut Position) -> Move {
    for m in generate_moves(pos) {
        let undo = pos.make_move(m);
        let valid = undo.valid;
        pos.unmake_move(m, undo);
        if valid {
            return m;
        }
    }
    Move::NULL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_at_least_one_depth_from_startpos() {
        let mut pos = Position::new_game();
        let mut tt = TranspositionTable::new(1);
        let mut ordering = OrderingContext::new(MAX_DEPTH);
        let options = SearchOptions { max_depth: 3, move_time: None };
        let outcome = iterative_deepening(&mut pos, &mut tt, &mut ordering, StopFlag::new(), options, None);
        assert!(outcome.depth >= 1);
        assert_ne!(outcome.best_move, Move::NULL);
    }

    #[test]
    fn finds_forced_mate_in_two() {
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R6K w - - 0 1").unwrap();
        let mut tt = TranspositionTable::new(1);
        let mut ordering = OrderingContext::new(MAX_DEPTH);
        let options = SearchOptions { max_depth: 5, move_time: None };
        let outcome = iterative_deepening(&mut pos, &mut tt, &mut ordering, StopFlag::new(), options, None);
        assert!(outcome.score > MATE_THRESHOLD);
    }

    #[test]
    fn already_stopped_flag_falls_back_to_a_legal_move() {
        let mut pos = Position::new_game();
        let mut tt = TranspositionTable::new(1);
        let mut ordering = OrderingContext::new(MAX_DEPTH);
        let stop_flag = StopFlag::stopped();
        let options = SearchOptions { max_depth: 5, move_time: None };
        let outcome = iterative_deepening(&mut pos, &mut tt, &mut ordering, stop_flag, options, None);
        assert_ne!(outcome.best_move, Move::NULL);
    }
}
