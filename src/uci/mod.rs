//! The UCI command loop: a line-oriented stdin/stdout protocol dispatcher
//! plus the `eval`/`evaltest`/`bench` auxiliary commands, all interleaved in
//! one dispatcher (grounded on the original engine's single-loop `UCI.cpp`
//! rather than split into separate binaries).

pub mod command;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::thread;

use crate::engine::Engine;
use crate::eval::evaluate;
use crate::position::Position;
use crate::search::{iterative_deepening, SearchOptions};
use crate::sync::StopFlag;
use crate::transposition_table::TranspositionTable;
use crate::uci_info;

use command::{parse_go_command, parse_position_command};

const ENGINE_NAME: &str = "mantissa";
const ENGINE_AUTHOR: &str = "the mantissa_engine contributors";

pub fn run_uci_loop() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut engine = Engine::new();

    let (info_tx, info_rx) = uci_info::channel();
    let printer = thread::spawn(move || {
        let stdout = io::stdout();
        while let Ok(info) = info_rx.recv() {
            let mut lock = stdout.lock();
            let _ = writeln!(lock, "{}", info.to_uci_line());
            let _ = lock.flush();
        }
    });

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "uci" => {
                println!("id name {ENGINE_NAME}");
                println!("id author {ENGINE_AUTHOR}");
                println!("option name Hash type spin default {} min 1 max 4096", crate::engine::DEFAULT_TT_MB);
                println!("option name Threads type spin default 1 min 1 max 1");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => engine.new_game(),
            "position" => {
                if let Some(pos) = parse_position_command(&parts) {
                    engine.set_position(pos);
                }
            }
            "go" => {
                let options = parse_go_command(&parts);
                engine.go(options, info_tx.clone());
            }
            "stop" => engine.stop(),
            "setoption" => apply_setoption(&mut engine, &parts),
            "eval" => run_eval_command(&parts),
            "evaltest" => run_evaltest_command(&parts),
            "bench" => run_bench_command(&parts),
            "quit" => {
                engine.quit();
                break;
            }
            other => warn(&format!("unknown command '{other}'")),
        }

        let _ = stdout.flush();
    }

    // Dropping our sender lets the printer thread's recv loop drain the
    // remaining queued info lines and exit; join it so quit doesn't race
    // the last depth's output past process exit.
    drop(info_tx);
    let _ = printer.join();
}

fn apply_setoption(engine: &mut Engine, parts: &[&str]) {
    let Some(name_start) = parts.iter().position(|&t| t == "name").map(|i| i + 1) else {
        warn("setoption missing 'name'");
        return;
    };
    let value_idx = parts.iter().position(|&t| t == "value");
    let name_end = value_idx.unwrap_or(parts.len());
    let name = parts[name_start..name_end].join(" ");
    let value = value_idx.map(|vi| parts[vi + 1..].join(" "));

    match name.as_str() {
        "Hash" => match value.and_then(|v| v.parse::<usize>().ok()) {
            Some(mb) => engine.set_hash_size_mb(mb),
            None => warn("setoption Hash missing a numeric value"),
        },
        "Threads" => {
            // Lazy-SMP is a Non-goal; accepted and ignored so a GUI that
            // always sends `Threads` doesn't choke the loop.
        }
        other => warn(&format!("unknown option '{other}'")),
    }
}

/// `eval <input.fen> <output.csv> <depth>`: for each input FEN line, runs a
/// depth-limited search and writes `FEN,score` to the output file.
fn run_eval_command(parts: &[&str]) {
    let (Some(input_path), Some(output_path), Some(depth)) = (
        parts.get(1),
        parts.get(2),
        parts.get(3).and_then(|s| s.parse::<i32>().ok()),
    ) else {
        warn("usage: eval <input.fen> <output.csv> <depth>");
        return;
    };

    let Ok(input) = File::open(input_path) else {
        warn(&format!("cannot open '{input_path}'"));
        return;
    };
    let Ok(mut output) = File::create(output_path) else {
        warn(&format!("cannot create '{output_path}'"));
        return;
    };

    for line in BufReader::new(input).lines().map_while(Result::ok) {
        let fen = line.trim();
        if fen.is_empty() {
            continue;
        }
        let Ok(mut pos) = Position::from_fen(fen) else {
            warn(&format!("skipping malformed FEN '{fen}'"));
            continue;
        };
        let mut tt = TranspositionTable::new(16);
        let mut ordering = crate::ordering::OrderingContext::new(crate::search::MAX_DEPTH);
        let options = SearchOptions { max_depth: depth, move_time: None };
        let outcome = iterative_deepening(&mut pos, &mut tt, &mut ordering, StopFlag::new(), options, None);
        let _ = writeln!(output, "{fen},{}", outcome.score);
    }
}

/// `evaltest <positions.fen>`: the evaluation-symmetry property check —
/// `evaluate(pos) == evaluate(pos.mirrored())` for every line in the file.
fn run_evaltest_command(parts: &[&str]) {
    let Some(input_path) = parts.get(1) else {
        warn("usage: evaltest <positions.fen>");
        return;
    };
    let Ok(input) = File::open(input_path) else {
        warn(&format!("cannot open '{input_path}'"));
        return;
    };

    let mut total = 0usize;
    let mut failures = 0usize;
    for line in BufReader::new(input).lines().map_while(Result::ok) {
        let fen = line.trim();
        if fen.is_empty() {
            continue;
        }
        let Ok(pos) = Position::from_fen(fen) else {
            warn(&format!("skipping malformed FEN '{fen}'"));
            continue;
        };
        total += 1;
        if evaluate(&pos) != evaluate(&pos.mirrored()) {
            failures += 1;
            println!("symmetry failure: {fen}");
        }
    }
    println!("evaltest: {failures}/{total} symmetry failures");
}

/// `bench <suite.epd> <moveTime>`: runs a time-bounded search on every
/// position in the suite and reports aggregate nodes/time.
fn run_bench_command(parts: &[&str]) {
    let (Some(suite_path), Some(move_time_ms)) =
        (parts.get(1), parts.get(2).and_then(|s| s.parse::<u64>().ok()))
    else {
        warn("usage: bench <suite.epd> <moveTime>");
        return;
    };
    let Ok(input) = File::open(suite_path) else {
        warn(&format!("cannot open '{suite_path}'"));
        return;
    };

    let mut total_nodes = 0u64;
    let start = std::time::Instant::now();
    for line in BufReader::new(input).lines().map_while(Result::ok) {
        let epd = line.trim();
        if epd.is_empty() {
            continue;
        }
        let fen_tokens: Vec<&str> = epd.split_whitespace().take(6).collect();
        let fen = fen_tokens.join(" ");
        let Ok(mut pos) = Position::from_fen(&fen) else {
            warn(&format!("skipping malformed EPD line '{epd}'"));
            continue;
        };
        let mut tt = TranspositionTable::new(64);
        let mut ordering = crate::ordering::OrderingContext::new(crate::search::MAX_DEPTH);
        let options = SearchOptions {
            max_depth: crate::search::MAX_DEPTH as i32 - 1,
            move_time: Some(std::time::Duration::from_millis(move_time_ms)),
        };
        let outcome = iterative_deepening(&mut pos, &mut tt, &mut ordering, StopFlag::new(), options, None);
        total_nodes += outcome.nodes;
        println!(
            "{fen}: depth {} score {} bestmove {}",
            outcome.depth,
            outcome.score,
            outcome.best_move.to_long_algebraic()
        );
    }
    let elapsed = start.elapsed();
    let nps = if elapsed.as_secs_f64() > 0.0 { (total_nodes as f64 / elapsed.as_secs_f64()) as u64 } else { 0 };
    println!("bench: {total_nodes} nodes in {:?} ({nps} nps)", elapsed);
}

fn warn(msg: &str) {
    #[cfg(feature = "logging")]
    log::warn!("{msg}");
    #[cfg(not(feature = "logging"))]
    eprintln!("{msg}");
}
