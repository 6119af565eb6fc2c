//! The main alpha-beta search: transposition-table probing, null-move
//! pruning, move ordering, and the recursive negamax loop.

use crate::eval::{evaluate, non_pawn_material, MATE_SCORE};
use crate::movegen::generate_moves;
use crate::ordering::order_moves;
use crate::position::Position;
use crate::search::quiescence::quiescence;
use crate::search::{SearchContext, MAX_DEPTH};
use crate::transposition_table::BoundType;

/// Minimum depth a null move is allowed to search its reduced re-search at.
const NULL_MOVE_MIN_DEPTH: i32 = 3;
const NULL_MOVE_REDUCTION: i32 = 3;
/// Guard against null-move pruning in king-and-pawn endings, where
/// zugzwang makes "skip a turn" an unsound lower bound.
const NULL_MOVE_MATERIAL_THRESHOLD: i32 = 500;

/// Negamax alpha-beta over `pos`, returning a score from the side-to-move's
/// perspective. `ply` is root-distance, incremented/decremented around this
/// call (not inside make/unmake, which is also used by perft and the
/// `eval`/`evaltest` tools with no search context).
pub fn alpha_beta(
    pos: &mut Position,
    ctx: &mut SearchContext,
    mut alpha: i32,
    beta: i32,
    depth: i32,
    ply: usize,
    do_null: bool,
) -> i32 {
    if ctx.control.poll() {
        return 0;
    }

    if ply > 0 && (pos.halfmove_clock >= 100 || pos.is_repetition()) {
        return 0;
    }

    if ply >= MAX_DEPTH - 1 {
        return evaluate(pos);
    }

    ctx.control.bump_node();

    if depth <= 0 {
        return quiescence(pos, ctx, alpha, beta, ply);
    }

    let probe = ctx.tt.probe(pos.hash, alpha, beta, depth, ply);
    if let Some(score) = probe.usable_score {
        return score;
    }
    let pv_move = probe.best_move;

    let in_check = pos.in_check();

    if do_null
        && !in_check
        && depth >= NULL_MOVE_MIN_DEPTH
        && non_pawn_material(pos, pos.side_to_move) > NULL_MOVE_MATERIAL_THRESHOLD
    {
        let undo = pos.make_null_move();
        let score = -alpha_beta(
            pos,
            ctx,
            -beta,
            -beta + 1,
            depth - NULL_MOVE_REDUCTION,
            ply + 1,
            false,
        );
        pos.unmake_null_move(undo);
        if ctx.control.is_stopped() {
            return 0;
        }
        if score >= beta {
            return beta;
        }
    }

    let mut moves = generate_moves(pos);
    order_moves(ctx.ordering, pos, &mut moves, ply, pv_move);

    let old_alpha = alpha;
    let mut best_move = None;
    let mut legal_moves = 0u32;

    for m in moves {
        let undo = pos.make_move(m);
        if !undo.valid {
            pos.unmake_move(m, undo);
            continue;
        }
        legal_moves += 1;

        let score = -alpha_beta(pos, ctx, -beta, -alpha, depth - 1, ply + 1, true);
        pos.unmake_move(m, undo);

        if ctx.control.is_stopped() {
            return 0;
        }

        if score >= beta {
            if m.is_quiet() {
                ctx.ordering.record_killer(ply, m);
                if let Some((_, piece)) = pos.piece_at(m.from()) {
                    ctx.ordering.record_history(piece, m.to(), depth);
                }
            }
            ctx.tt.store(pos.hash, depth, beta, BoundType::Lower, Some(m), ply);
            return beta;
        }

        if score > alpha {
            alpha = score;
            best_move = Some(m);
        }
    }

    if legal_moves == 0 {
        return if in_check {
            -MATE_SCORE + ply as i32
        } else {
            0
        };
    }

    let bound = if alpha > old_alpha { BoundType::Exact } else { BoundType::Upper };
    ctx.tt.store(pos.hash, depth, alpha, bound, best_move, ply);
    alpha
}
