//! Crate root: bitboard position representation, magic-bitboard move
//! generation, alpha-beta search, tapered evaluation, and the UCI protocol
//! front end.

pub mod bitboard;
pub mod engine;
pub mod error;
pub mod eval;
pub mod magic;
pub mod movegen;
pub mod ordering;
pub mod perft;
pub mod position;
pub mod search;
pub mod see;
pub mod sync;
pub mod timer;
pub mod transposition_table;
pub mod types;
pub mod uci;
pub mod uci_info;
pub mod zobrist;
