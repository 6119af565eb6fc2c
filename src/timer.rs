//! A background-thread wall-clock deadline that force-stops a search
//! independent of the search loop's own per-node polling.

use std::thread;
use std::time::Instant;

use crate::sync::StopFlag;

/// Spawns a timer thread that sets `stop_flag` once `deadline` passes. If the
/// deadline has already passed, stops immediately on the caller's thread.
pub fn spawn_deadline_timer(deadline: Instant, stop_flag: StopFlag) {
    let now = Instant::now();
    if deadline <= now {
        stop_flag.stop();
        return;
    }
    let duration = deadline - now;
    thread::spawn(move || {
        thread::sleep(duration);
        stop_flag.stop();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fires_after_the_deadline_elapses() {
        let flag = StopFlag::new();
        spawn_deadline_timer(Instant::now() + Duration::from_millis(20), flag.clone());
        assert!(!flag.is_stopped());
        thread::sleep(Duration::from_millis(100));
        assert!(flag.is_stopped());
    }

    #[test]
    fn past_deadline_stops_immediately() {
        let flag = StopFlag::new();
        let past = Instant::now().checked_sub(Duration::from_secs(1)).unwrap();
        spawn_deadline_timer(past, flag.clone());
        assert!(flag.is_stopped());
    }
}
