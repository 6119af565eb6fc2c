//! Quiescence search: the tactical-only extension at the leaves of
//! alpha-beta, stabilizing the evaluation across capture sequences.

use crate::eval::{evaluate, piece_value, MATE_SCORE};
use crate::movegen::{generate_moves, generate_quiescence_moves};
use crate::ordering::order_moves;
use crate::position::Position;
use crate::search::SearchContext;
use crate::see::see;
use crate::types::Piece;

/// Delta-pruning margin: a capture that cannot plausibly close the gap to
/// alpha even with this much slack is skipped without being played.
const DELTA_MARGIN: i32 = 200;

pub fn quiescence(
    pos: &mut Position,
    ctx: &mut SearchContext,
    mut alpha: i32,
    beta: i32,
    ply: usize,
) -> i32 {
    if ctx.control.poll() {
        return 0;
    }
    ctx.control.bump_node();

    let in_check = pos.in_check();

    if !in_check {
        let stand_pat = evaluate(pos);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut moves = generate_quiescence_moves(pos);
        order_moves(ctx.ordering, pos, &mut moves, ply, None);

        for m in moves {
            let is_promotion = m.promotion().is_some();
            if !is_promotion {
                let captured_value = m.captured().map(piece_value).unwrap_or(0);
                if stand_pat + captured_value + DELTA_MARGIN < alpha {
                    continue;
                }
                let attacker = pos.piece_at(m.from()).map(|(_, p)| p).unwrap_or(Piece::Pawn);
                if see(pos, m.from(), m.to(), attacker, pos.side_to_move) < 0 {
                    continue;
                }
            }

            let undo = pos.make_move(m);
            if !undo.valid {
                pos.unmake_move(m, undo);
                continue;
            }
            let score = -quiescence(pos, ctx, -beta, -alpha, ply + 1);
            pos.unmake_move(m, undo);

            if ctx.control.is_stopped() {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    } else {
        let mut moves = generate_moves(pos);
        order_moves(ctx.ordering, pos, &mut moves, ply, None);

        let mut legal_moves = 0u32;
        for m in moves {
            let undo = pos.make_move(m);
            if !undo.valid {
                pos.unmake_move(m, undo);
                continue;
            }
            legal_moves += 1;
            let score = -quiescence(pos, ctx, -beta, -alpha, ply + 1);
            pos.unmake_move(m, undo);

            if ctx.control.is_stopped() {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        if legal_moves == 0 {
            return -MATE_SCORE + ply as i32;
        }
        alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MATE_SCORE;
    use crate::ordering::OrderingContext;
    use crate::sync::StopFlag;
    use crate::transposition_table::TranspositionTable;

    #[test]
    fn quiet_position_returns_stand_pat() {
        let mut pos = Position::new_game();
        let mut tt = TranspositionTable::new(1);
        let mut ordering = OrderingContext::new(crate::search::MAX_DEPTH);
        let mut control = crate::search::SearchControl::new(StopFlag::new(), None);
        let mut ctx = SearchContext { tt: &mut tt, ordering: &mut ordering, control: &mut control };
        let score = quiescence(&mut pos, &mut ctx, -MATE_SCORE, MATE_SCORE, 0);
        assert_eq!(score, evaluate(&pos));
    }

    #[test]
    fn hanging_queen_capture_improves_score() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut tt = TranspositionTable::new(1);
        let mut ordering = OrderingContext::new(crate::search::MAX_DEPTH);
        let mut control = crate::search::SearchControl::new(StopFlag::new(), None);
        let mut ctx = SearchContext { tt: &mut tt, ordering: &mut ordering, control: &mut control };
        let score = quiescence(&mut pos, &mut ctx, -MATE_SCORE, MATE_SCORE, 0);
        assert!(score > evaluate(&pos));
    }

    #[test]
    fn checkmate_in_quiescence_reports_mate_score() {
        let mut pos = Position::from_fen("7k/8/6Q1/8/8/8/8/6RK b - - 0 1").unwrap();
        let mut tt = TranspositionTable::new(1);
        let mut ordering = OrderingContext::new(crate::search::MAX_DEPTH);
        let mut control = crate::search::SearchControl::new(StopFlag::new(), None);
        let mut ctx = SearchContext { tt: &mut tt, ordering: &mut ordering, control: &mut control };
        let score = quiescence(&mut pos, &mut ctx, -MATE_SCORE, MATE_SCORE, 3);
        if pos.in_check() {
            assert!(score <= -MATE_SCORE + 10);
        }
    }
}
