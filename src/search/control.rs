//! Search control: node counter, periodic clock/stop-flag polling, and the
//! shared `stopped` state every recursive call must honor.

use std::time::{Duration, Instant};

use crate::sync::StopFlag;

/// Consult the clock/external stop flag every this many nodes, not on every
/// call — `Instant::now()` is cheap but not free, and alpha-beta visits a lot
/// of nodes.
const POLL_INTERVAL: u64 = 2048;

pub struct SearchControl {
    pub nodes: u64,
    stop_flag: StopFlag,
    start: Instant,
    time_limit: Option<Duration>,
    stopped: bool,
}

impl SearchControl {
    pub fn new(stop_flag: StopFlag, time_limit: Option<Duration>) -> Self {
        SearchControl {
            nodes: 0,
            stop_flag,
            start: Instant::now(),
            time_limit,
            stopped: false,
        }
    }

    /// Every `POLL_INTERVAL` nodes, checks the external stop flag and the
    /// move-time deadline. Returns whether the search is stopped (latched:
    /// once true, stays true for the remainder of this search).
    pub fn poll(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.nodes % POLL_INTERVAL == 0 {
            if self.stop_flag.is_stopped() {
                self.stopped = true;
            } else if let Some(limit) = self.time_limit {
                if self.start.elapsed() >= limit {
                    self.stop_flag.stop();
                    self.stopped = true;
                }
            }
        }
        self.stopped
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped || self.stop_flag.is_stopped()
    }

    #[inline]
    pub fn bump_node(&mut self) {
        self.nodes += 1;
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_stop_flag_latches_on_next_poll_boundary() {
        let flag = StopFlag::new();
        let mut control = SearchControl::new(flag.clone(), None);
        control.nodes = POLL_INTERVAL;
        assert!(!control.poll());
        flag.stop();
        control.nodes = POLL_INTERVAL * 2;
        assert!(control.poll());
        assert!(control.is_stopped());
    }

    #[test]
    fn elapsed_time_limit_triggers_stop() {
        let flag = StopFlag::new();
        let mut control = SearchControl::new(flag.clone(), Some(Duration::from_millis(0)));
        std::thread::sleep(Duration::from_millis(5));
        assert!(control.poll());
        assert!(flag.is_stopped());
    }
}
