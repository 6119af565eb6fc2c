//! Token parsing for the `position` and `go` UCI commands: a `while`-index
//! scan over whitespace-split tokens, case-matched on keyword, tolerant of
//! unrecognized tokens (a real GUI sends plenty we don't implement).

use std::time::Duration;

use crate::movegen::generate_moves;
use crate::position::Position;
use crate::search::SearchOptions;
use crate::search::MAX_DEPTH;
use crate::types::Move;

/// Parses `position startpos|fen <FEN> [moves m1 m2 ...]` into a fresh
/// `Position`. Returns `None` (after logging) on a malformed `fen` clause;
/// an illegal move in the `moves` list stops applying the remainder and
/// returns the position as of the last valid move.
pub fn parse_position_command(parts: &[&str]) -> Option<Position> {
    let mut i = 1;
    let mut pos = match parts.get(i).copied() {
        Some("startpos") => {
            i += 1;
            Position::new_game()
        }
        Some("fen") => {
            i += 1;
            let fen_tokens: Vec<&str> = parts[i..]
                .iter()
                .take_while(|&&t| t != "moves")
                .copied()
                .collect();
            i += fen_tokens.len();
            let fen = fen_tokens.join(" ");
            match Position::from_fen(&fen) {
                Ok(p) => p,
                Err(e) => {
                    log_warn(&format!("malformed FEN '{fen}': {e}"));
                    return None;
                }
            }
        }
        _ => {
            log_warn("position command missing startpos/fen");
            return None;
        }
    };

    if parts.get(i).copied() == Some("moves") {
        i += 1;
        while i < parts.len() {
            match parse_move_text(&pos, parts[i]) {
                Some(m) => {
                    let undo = pos.make_move(m);
                    if !undo.valid {
                        pos.unmake_move(m, undo);
                        log_warn(&format!("illegal move '{}', stopping replay", parts[i]));
                        break;
                    }
                }
                None => {
                    log_warn(&format!("unparseable move text '{}', stopping replay", parts[i]));
                    break;
                }
            }
            i += 1;
        }
    }

    Some(pos)
}

/// Matches long-algebraic text (`e2e4`, `e7e8q`) against the pseudo-legal
/// moves from `pos`, since the packed `Move` doesn't round-trip from text
/// alone (it needs the captured-piece code, which only move generation
/// knows).
pub fn parse_move_text(pos: &Position, text: &str) -> Option<Move> {
    generate_moves(pos)
        .into_iter()
        .find(|m| m.to_long_algebraic() == text)
}

/// Parses `go [depth N] [movetime MS] ...`, tolerating and ignoring every
/// other UCI `go` parameter (`wtime`/`btime`/`winc`/`binc`/`nodes`/
/// `infinite`/`ponder`/`mate`) since Lazy-SMP/pondering support is a
/// Non-goal but a real GUI may still send the tokens.
pub fn parse_go_command(parts: &[&str]) -> SearchOptions {
    let mut options = SearchOptions::default();
    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                if let Some(d) = parts.get(i + 1).and_then(|s| s.parse::<i32>().ok()) {
                    options.max_depth = d.min(MAX_DEPTH as i32 - 1);
                }
                i += 2;
            }
            "movetime" => {
                if let Some(ms) = parts.get(i + 1).and_then(|s| s.parse::<u64>().ok()) {
                    options.move_time = Some(Duration::from_millis(ms));
                }
                i += 2;
            }
            "infinite" => {
                options.move_time = None;
                i += 1;
            }
            "wtime" | "btime" | "winc" | "binc" | "nodes" | "mate" => i += 2,
            "ponder" => i += 1,
            _ => i += 1,
        }
    }
    options
}

fn log_warn(msg: &str) {
    #[cfg(feature = "logging")]
    log::warn!("{msg}");
    #[cfg(not(feature = "logging"))]
    eprintln!("{msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_startpos_with_moves() {
        let parts: Vec<&str> = "position startpos moves e2e4 e7e5".split_whitespace().collect();
        let pos = parse_position_command(&parts).unwrap();
        assert_eq!(pos.side_to_move, crate::types::Color::White);
        assert_ne!(pos.to_fen(), crate::position::STARTPOS_FEN);
    }

    #[test]
    fn parses_fen_with_trailing_moves() {
        let parts: Vec<&str> =
            "position fen r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1 moves a2a3"
                .split_whitespace()
                .collect();
        let pos = parse_position_command(&parts).unwrap();
        assert_eq!(pos.side_to_move, crate::types::Color::Black);
    }

    #[test]
    fn illegal_move_stops_replay_but_keeps_the_position() {
        let parts: Vec<&str> = "position startpos moves e2e4 e2e4".split_whitespace().collect();
        let pos = parse_position_command(&parts).unwrap();
        assert_eq!(pos.side_to_move, crate::types::Color::Black);
    }

    #[test]
    fn go_depth_and_movetime_parse() {
        let parts: Vec<&str> = "go depth 12 movetime 500".split_whitespace().collect();
        let options = parse_go_command(&parts);
        assert_eq!(options.max_depth, 12);
        assert_eq!(options.move_time, Some(Duration::from_millis(500)));
    }

    #[test]
    fn unknown_go_tokens_are_tolerated() {
        let parts: Vec<&str> = "go wtime 5000 btime 5000 winc 0 binc 0".split_whitespace().collect();
        let options = parse_go_command(&parts);
        assert_eq!(options.move_time, None);
    }
}
