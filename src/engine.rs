//! The engine driver: owns the position, the transposition table, and the
//! move-ordering heuristics for the lifetime of the process, and bridges the
//! UCI command layer to the search module.
//!
//! Concurrency model: `Idle -> Searching` on `go`, spawning exactly one
//! worker thread that runs iterative deepening to completion or until
//! cancelled; `Searching -> Idle` on natural completion or `stop`. The
//! position is cloned by value into the worker so the driver's own copy
//! stays free for the next `position` command. The TT and ordering tables
//! are process-wide and shared via `Arc<Mutex<_>>`, but only one worker ever
//! touches them at a time: the driver always joins the previous worker
//! before starting a new one or mutating either table.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::ordering::OrderingContext;
use crate::position::Position;
use crate::search::{iterative_deepening, SearchOptions, MAX_DEPTH};
use crate::sync::StopFlag;
use crate::timer::spawn_deadline_timer;
use crate::transposition_table::TranspositionTable;
use crate::uci_info::Info;

/// Default transposition table budget in megabytes, per the data model's
/// configured-size default.
pub const DEFAULT_TT_MB: usize = 256;

pub struct Engine {
    position: Position,
    tt: Arc<Mutex<TranspositionTable>>,
    ordering: Arc<Mutex<OrderingContext>>,
    stop_flag: StopFlag,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            position: Position::new_game(),
            tt: Arc::new(Mutex::new(TranspositionTable::new(DEFAULT_TT_MB))),
            ordering: Arc::new(Mutex::new(OrderingContext::new(MAX_DEPTH))),
            stop_flag: StopFlag::new(),
            worker: None,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Joins any running worker (required before any of the mutations
    /// below), then replaces the driver's position.
    pub fn set_position(&mut self, pos: Position) {
        self.join_worker();
        self.position = pos;
    }

    pub fn is_searching(&self) -> bool {
        self.worker.is_some()
    }

    /// `ucinewgame`: join the running search, clear the TT and heuristics,
    /// and reset to the start position. Only valid while `Idle` per the
    /// search state machine; callers must not issue this mid-search without
    /// first accepting that it blocks until the worker stops.
    pub fn new_game(&mut self) {
        self.join_worker();
        self.tt.lock().clear();
        self.ordering.lock().clear();
        self.stop_flag.reset();
        self.position = Position::new_game();
    }

    /// `setoption name Hash value <mb>`, only accepted while `Idle`.
    pub fn set_hash_size_mb(&mut self, mb: usize) {
        self.join_worker();
        self.tt.lock().resize(mb);
    }

    /// Spawns exactly one worker running iterative deepening on a clone of
    /// the current position. The worker itself prints the `bestmove` line
    /// when it finishes, whether that's natural completion or a `stop`.
    pub fn go(&mut self, options: SearchOptions, info_tx: Sender<Info>) {
        self.join_worker();
        self.stop_flag.reset();

        let mut pos = self.position.clone();
        let tt = Arc::clone(&self.tt);
        let ordering = Arc::clone(&self.ordering);
        let stop_flag = self.stop_flag.clone();

        // A hard wall-clock backstop independent of node-count polling: if a
        // single recursive call runs long between polls, the deadline still
        // fires and stops the search.
        if let Some(move_time) = options.move_time {
            spawn_deadline_timer(std::time::Instant::now() + move_time, stop_flag.clone());
        }

        self.worker = Some(std::thread::spawn(move || {
            let mut tt_guard = tt.lock();
            let mut ordering_guard = ordering.lock();
            let outcome = iterative_deepening(
                &mut pos,
                &mut tt_guard,
                &mut ordering_guard,
                stop_flag,
                options,
                Some(&info_tx),
            );
            drop(tt_guard);
            drop(ordering_guard);
            #[cfg(feature = "logging")]
            log::debug!(
                "search finished: depth={} nodes={} score={}",
                outcome.depth,
                outcome.nodes,
                outcome.score
            );
            println!("bestmove {}", outcome.best_move.to_long_algebraic());
        }));
    }

    /// `stop`: signal the worker and join it. The worker still emits its
    /// `bestmove` line before exiting.
    pub fn stop(&mut self) {
        self.stop_flag.stop();
        self.join_worker();
    }

    /// `quit`: same as `stop`, named for the caller's intent.
    pub fn quit(&mut self) {
        self.stop_flag.stop();
        self.join_worker();
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop_flag.stop();
        self.join_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_engine_starts_idle_at_startpos() {
        let engine = Engine::new();
        assert!(!engine.is_searching());
        assert_eq!(engine.position().to_fen(), crate::position::STARTPOS_FEN);
    }

    #[test]
    fn go_then_stop_emits_bestmove_and_returns_to_idle() {
        let mut engine = Engine::new();
        let (tx, _rx) = crate::uci_info::channel();
        let options = SearchOptions { max_depth: 20, move_time: None };
        engine.go(options, tx);
        assert!(engine.is_searching());
        engine.stop();
        assert!(!engine.is_searching());
    }

    #[test]
    fn new_game_resets_position_and_joins_worker() {
        let mut engine = Engine::new();
        let (tx, _rx) = crate::uci_info::channel();
        engine.go(SearchOptions { max_depth: 20, move_time: None }, tx);
        engine.new_game();
        assert!(!engine.is_searching());
        assert_eq!(engine.position().to_fen(), crate::position::STARTPOS_FEN);
    }
}
