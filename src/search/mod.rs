//! Iterative-deepening alpha-beta search: node control, the main search,
//! quiescence, and the depth-by-depth driver, one file per concern like the
//! teacher's own `search/` split.

pub mod alpha_beta;
pub mod control;
pub mod iterative;
pub mod quiescence;

pub use control::SearchControl;
pub use iterative::{iterative_deepening, SearchOptions, SearchOutcome};

use crate::ordering::OrderingContext;
use crate::transposition_table::TranspositionTable;

/// Maximum recursion depth in plies. Bounds the killer-move table and the
/// `ply >= MAX_DEPTH - 1` overflow guard in `alpha_beta`.
pub const MAX_DEPTH: usize = 64;

/// The mutable state a single search shares across every recursive call:
/// the transposition table and move-ordering heuristics (process-wide,
/// borrowed for the duration of one worker's search) and the node/time
/// control block (owned by this search alone).
pub struct SearchContext<'a> {
    pub tt: &'a mut TranspositionTable,
    pub ordering: &'a mut OrderingContext,
    pub control: &'a mut SearchControl,
}
