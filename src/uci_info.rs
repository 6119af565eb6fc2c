//! The `info` progress line sent from a search worker to the UCI printer
//! thread, and the channel that carries it.
//!
//! Mate scores are reported as plain centipawn values outside the mate band
//! rather than converted to UCI's `score mate N` — the protocol deviation is
//! deliberate, not an oversight.

use std::sync::mpsc::{Receiver, Sender};

#[derive(Clone, Debug)]
pub struct Info {
    pub depth: u32,
    pub score_cp: i32,
    pub nodes: u64,
    pub time_ms: u128,
    pub pv: Vec<String>,
}

impl Info {
    /// `info depth <d> score cp <s> nodes <n> time <ms> pv <m1> <m2> ...`
    pub fn to_uci_line(&self) -> String {
        let mut line = format!(
            "info depth {} score cp {} nodes {} time {}",
            self.depth, self.score_cp, self.nodes, self.time_ms
        );
        if !self.pv.is_empty() {
            line.push_str(" pv ");
            line.push_str(&self.pv.join(" "));
        }
        line
    }
}

pub fn channel() -> (Sender<Info>, Receiver<Info>) {
    std::sync::mpsc::channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_line_in_spec_order() {
        let info = Info {
            depth: 6,
            score_cp: 37,
            nodes: 12_345,
            time_ms: 250,
            pv: vec!["e2e4".to_string(), "e7e5".to_string()],
        };
        assert_eq!(info.to_uci_line(), "info depth 6 score cp 37 nodes 12345 time 250 pv e2e4 e7e5");
    }

    #[test]
    fn mate_scores_are_plain_centipawns() {
        let info = Info {
            depth: 4,
            score_cp: 99_998,
            nodes: 10,
            time_ms: 5,
            pv: vec![],
        };
        assert!(info.to_uci_line().contains("score cp 99998"));
        assert!(!info.to_uci_line().contains("mate"));
    }
}
