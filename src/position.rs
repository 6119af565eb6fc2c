//! Mutable board position: piece placement, make/unmake, Zobrist maintenance,
//! repetition history, and FEN parsing/serialization.

use crate::bitboard::{
    BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE,
};
use crate::error::FenError;
use crate::magic;
use crate::types::{CastleSide, Color, Move, NullUndo, Piece, Square, Undo};
use crate::zobrist;

const A1: u8 = 0;
const H1: u8 = 7;
const A8: u8 = 56;
const H8: u8 = 63;

/// A full chess position: piece placement plus the state needed to make and
/// exactly unmake moves (castling rights, en-passant target, move clocks,
/// Zobrist hash, repetition history).
#[derive(Clone, Debug)]
pub struct Position {
    board: [Option<(Color, Piece)>; 64],
    piece_bb: [[u64; 6]; 2],
    color_bb: [u64; 2],
    pub side_to_move: Color,
    /// Bitmask: 1=WK, 2=WQ, 4=BK, 8=BQ.
    pub castling_rights: u8,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub hash: u64,
    king_square: [Square; 2],
    /// Zobrist key after each ply played so far, used for repetition detection.
    pub history: Vec<u64>,
}

impl Position {
    pub fn new_game() -> Position {
        Position::from_fen(STARTPOS_FEN).expect("startpos FEN is well-formed")
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.board[sq.index()]
    }

    #[inline]
    pub fn occupied(&self) -> u64 {
        self.color_bb[0] | self.color_bb[1]
    }

    #[inline]
    pub fn color_occupancy(&self, color: Color) -> u64 {
        self.color_bb[color.index()]
    }

    #[inline]
    pub fn piece_occupancy(&self, color: Color, piece: Piece) -> u64 {
        self.piece_bb[color.index()][piece.index()]
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_square[color.index()]
    }

    /// Total material for `color` in centipawns, using the fixed piece values.
    pub fn material(&self, color: Color) -> i32 {
        Piece::ALL
            .iter()
            .map(|&p| {
                crate::eval::piece_value(p)
                    * self.piece_occupancy(color, p).count_ones() as i32
            })
            .sum()
    }

    fn put_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        debug_assert!(self.board[sq.index()].is_none());
        self.board[sq.index()] = Some((color, piece));
        self.piece_bb[color.index()][piece.index()] |= sq.bit();
        self.color_bb[color.index()] |= sq.bit();
        self.hash ^= zobrist::piece_key(color, piece, sq);
        if piece == Piece::King {
            self.king_square[color.index()] = sq;
        }
    }

    fn remove_piece(&mut self, sq: Square) -> (Color, Piece) {
        let (color, piece) = self.board[sq.index()].take().expect("square is occupied");
        self.piece_bb[color.index()][piece.index()] &= !sq.bit();
        self.color_bb[color.index()] &= !sq.bit();
        self.hash ^= zobrist::piece_key(color, piece, sq);
        (color, piece)
    }

    fn set_en_passant(&mut self, target: Option<Square>) {
        if let Some(sq) = self.en_passant {
            self.hash ^= zobrist::en_passant_key(sq.file());
        }
        if let Some(sq) = target {
            self.hash ^= zobrist::en_passant_key(sq.file());
        }
        self.en_passant = target;
    }

    fn clear_castling_bit(&mut self, bit: u8) {
        if self.castling_rights & bit != 0 {
            let (color, side) = match bit {
                WHITE_KINGSIDE => (Color::White, 0),
                WHITE_QUEENSIDE => (Color::White, 1),
                BLACK_KINGSIDE => (Color::Black, 0),
                BLACK_QUEENSIDE => (Color::Black, 1),
                _ => unreachable!(),
            };
            self.hash ^= zobrist::castling_key(color, side);
            self.castling_rights &= !bit;
        }
    }

    /// Applies `m` to the position. Always mutates; the returned `Undo.valid`
    /// is `false` when the move left the mover's own king in check — the
    /// caller must still call `unmake_move` to rewind, then discard the move.
    pub fn make_move(&mut self, m: Move) -> Undo {
        let mover = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let pre_castling = self.castling_rights;
        let pre_ep = self.en_passant;
        let pre_halfmove = self.halfmove_clock;
        let pre_hash = self.hash;

        self.set_en_passant(None);

        let (_, moved_piece) = self.remove_piece(from);
        let mut captured = None;

        if m.is_en_passant() {
            let cap_sq = Square::new(from.rank(), to.file());
            let (_, cap_piece) = self.remove_piece(cap_sq);
            captured = Some((cap_piece, cap_sq));
        } else if let Some((_, existing_piece)) = self.board[to.index()] {
            self.remove_piece(to);
            captured = Some((existing_piece, to));
        }

        let placed_piece = m.promotion().unwrap_or(moved_piece);
        self.put_piece(mover, placed_piece, to);

        if m.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(mover, m.castle_side());
            let (_, rook) = self.remove_piece(rook_from);
            self.put_piece(mover, rook, rook_to);
        }

        if m.is_double_push() {
            let step: i32 = if mover == Color::White { 1 } else { -1 };
            let ep_rank = (from.rank() as i32 + step) as usize;
            self.set_en_passant(Some(Square::new(ep_rank, from.file())));
        }

        if moved_piece == Piece::King {
            if mover == Color::White {
                self.clear_castling_bit(WHITE_KINGSIDE);
                self.clear_castling_bit(WHITE_QUEENSIDE);
            } else {
                self.clear_castling_bit(BLACK_KINGSIDE);
                self.clear_castling_bit(BLACK_QUEENSIDE);
            }
        }
        self.clear_rook_right_if_touched(from.index() as u8);
        self.clear_rook_right_if_touched(to.index() as u8);

        if moved_piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if mover == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = mover.opposite();
        self.hash ^= zobrist::side_to_move_key();
        self.history.push(self.hash);

        let valid = !self.is_square_attacked(self.king_square(mover), mover.opposite());

        Undo {
            castling_rights: pre_castling,
            en_passant: pre_ep,
            halfmove_clock: pre_halfmove,
            hash: pre_hash,
            captured,
            valid,
        }
    }

    fn clear_rook_right_if_touched(&mut self, square_index: u8) {
        match square_index {
            A1 => self.clear_castling_bit(WHITE_QUEENSIDE),
            H1 => self.clear_castling_bit(WHITE_KINGSIDE),
            A8 => self.clear_castling_bit(BLACK_QUEENSIDE),
            H8 => self.clear_castling_bit(BLACK_KINGSIDE),
            _ => {}
        }
    }

    /// Exact inverse of `make_move`, using the `Undo` it returned.
    pub fn unmake_move(&mut self, m: Move, undo: Undo) {
        self.history.pop();
        self.side_to_move = self.side_to_move.opposite();
        let mover = self.side_to_move;
        let from = m.from();
        let to = m.to();

        let (_, placed_piece) = self.remove_piece(to);
        let original_piece = if m.promotion().is_some() {
            Piece::Pawn
        } else {
            placed_piece
        };
        self.put_piece(mover, original_piece, from);

        if m.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(mover, m.castle_side());
            let (_, rook) = self.remove_piece(rook_to);
            self.put_piece(mover, rook, rook_from);
        }

        if let Some((piece, sq)) = undo.captured {
            let opponent = mover.opposite();
            self.put_piece(opponent, piece, sq);
        }

        self.castling_rights = undo.castling_rights;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }
    }

    pub fn make_null_move(&mut self) -> NullUndo {
        let pre_ep = self.en_passant;
        let pre_hash = self.hash;
        self.set_en_passant(None);
        self.side_to_move = self.side_to_move.opposite();
        self.hash ^= zobrist::side_to_move_key();
        self.history.push(self.hash);
        NullUndo {
            en_passant: pre_ep,
            hash: pre_hash,
        }
    }

    pub fn unmake_null_move(&mut self, undo: NullUndo) {
        self.history.pop();
        self.side_to_move = self.side_to_move.opposite();
        self.en_passant = undo.en_passant;
        self.hash = undo.hash;
    }

    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        self.attackers_to(sq, by) != 0
    }

    pub fn in_check(&self) -> bool {
        let mover = self.side_to_move;
        self.is_square_attacked(self.king_square(mover), mover.opposite())
    }

    /// Bitboard of every `by`-colored piece attacking `sq`, computed by
    /// projecting each piece kind's attack pattern from `sq` and intersecting
    /// with the actual occupancy of that kind. Doubles as the SEE primitive.
    pub fn attackers_to(&self, sq: Square, by: Color) -> u64 {
        let occ = self.occupied();
        let mut attackers = 0u64;
        attackers |= crate::bitboard::KNIGHT_ATTACKS[sq.index()] & self.piece_occupancy(by, Piece::Knight);
        attackers |= crate::bitboard::KING_ATTACKS[sq.index()] & self.piece_occupancy(by, Piece::King);
        let bishops_queens = self.piece_occupancy(by, Piece::Bishop) | self.piece_occupancy(by, Piece::Queen);
        attackers |= magic::bishop_attacks(sq, occ) & bishops_queens;
        let rooks_queens = self.piece_occupancy(by, Piece::Rook) | self.piece_occupancy(by, Piece::Queen);
        attackers |= magic::rook_attacks(sq, occ) & rooks_queens;
        attackers |= pawn_attackers(sq, by, self.piece_occupancy(by, Piece::Pawn));
        attackers
    }

    /// Swaps colors, mirrors every square vertically, and swaps castling
    /// rights and the en-passant square accordingly. Used by the
    /// evaluation-symmetry property: `evaluate(pos) == evaluate(pos.mirrored())`.
    pub fn mirrored(&self) -> Position {
        let mut board = [None; 64];
        let mut piece_bb = [[0u64; 6]; 2];
        let mut color_bb = [0u64; 2];
        let mut king_square = [Square(0); 2];

        for sq_idx in 0..64u8 {
            if let Some((color, piece)) = self.board[sq_idx as usize] {
                let mirrored_color = color.opposite();
                let mirrored_sq = Square(sq_idx).mirror();
                board[mirrored_sq.index()] = Some((mirrored_color, piece));
                piece_bb[mirrored_color.index()][piece.index()] |= mirrored_sq.bit();
                color_bb[mirrored_color.index()] |= mirrored_sq.bit();
                if piece == Piece::King {
                    king_square[mirrored_color.index()] = mirrored_sq;
                }
            }
        }

        let mirror_castling_bit = |bit: u8, src: u8, dst: u8| -> u8 {
            if self.castling_rights & src != 0 {
                bit | dst
            } else {
                bit
            }
        };
        let mut castling_rights = 0u8;
        castling_rights = mirror_castling_bit(castling_rights, WHITE_KINGSIDE, BLACK_KINGSIDE);
        castling_rights = mirror_castling_bit(castling_rights, WHITE_QUEENSIDE, BLACK_QUEENSIDE);
        castling_rights = mirror_castling_bit(castling_rights, BLACK_KINGSIDE, WHITE_KINGSIDE);
        castling_rights = mirror_castling_bit(castling_rights, BLACK_QUEENSIDE, WHITE_QUEENSIDE);

        let mut pos = Position {
            board,
            piece_bb,
            color_bb,
            side_to_move: self.side_to_move.opposite(),
            castling_rights,
            en_passant: self.en_passant.map(|sq| sq.mirror()),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: 0,
            king_square,
            history: Vec::new(),
        };
        pos.hash = pos.recompute_hash();
        pos.history.push(pos.hash);
        pos
    }

    /// True iff the current hash already appears earlier in `history`,
    /// within the half-move-clock window (the 50-move rule bounds how far
    /// back a repetition can reach). The hash encodes side-to-move, castling
    /// rights, and en-passant target, so an equal hash is a true repetition
    /// without needing to separately check parity.
    pub fn is_repetition(&self) -> bool {
        let len = self.history.len();
        if len < 5 {
            return false;
        }
        let window = (self.halfmove_clock as usize).min(len - 1);
        let start = len - 1 - window;
        self.history[start..len - 1].iter().any(|&h| h == self.hash)
    }

    /// Recomputes the Zobrist key from scratch, for consistency testing
    /// against the incrementally maintained `hash` field.
    pub fn recompute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for sq_idx in 0..64u8 {
            if let Some((color, piece)) = self.board[sq_idx as usize] {
                hash ^= zobrist::piece_key(color, piece, Square(sq_idx));
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= zobrist::side_to_move_key();
        }
        if self.castling_rights & WHITE_KINGSIDE != 0 {
            hash ^= zobrist::castling_key(Color::White, 0);
        }
        if self.castling_rights & WHITE_QUEENSIDE != 0 {
            hash ^= zobrist::castling_key(Color::White, 1);
        }
        if self.castling_rights & BLACK_KINGSIDE != 0 {
            hash ^= zobrist::castling_key(Color::Black, 0);
        }
        if self.castling_rights & BLACK_QUEENSIDE != 0 {
            hash ^= zobrist::castling_key(Color::Black, 1);
        }
        if let Some(ep) = self.en_passant {
            hash ^= zobrist::en_passant_key(ep.file());
        }
        hash
    }

    pub fn to_fen(&self) -> String {
        let mut ranks = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::new(rank, file);
                match self.board[sq.index()] {
                    None => empty += 1,
                    Some((color, piece)) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(piece_char(color, piece));
                    }
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            ranks.push(row);
        }
        let placement = ranks.join("/");
        let side = if self.side_to_move == Color::White { "w" } else { "b" };
        let mut castling = String::new();
        if self.castling_rights & WHITE_KINGSIDE != 0 {
            castling.push('K');
        }
        if self.castling_rights & WHITE_QUEENSIDE != 0 {
            castling.push('Q');
        }
        if self.castling_rights & BLACK_KINGSIDE != 0 {
            castling.push('k');
        }
        if self.castling_rights & BLACK_QUEENSIDE != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let ep = self
            .en_passant
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, ep, self.halfmove_clock, self.fullmove_number
        )
    }

    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }
        let mut board = [None; 64];
        let mut piece_bb = [[0u64; 6]; 2];
        let mut color_bb = [0u64; 2];
        let mut king_square = [Square(0); 2];

        for (rank_from_top, rank_str) in parts[0].split('/').enumerate() {
            if rank_from_top >= 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_from_top,
                    files: 0,
                });
            }
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if file >= 8 {
                    return Err(FenError::TooManyFiles { rank, files: file + 1 });
                }
                let (color, piece) = piece_from_char(ch).ok_or(FenError::InvalidPiece { char: ch })?;
                let sq = Square::new(rank, file);
                board[sq.index()] = Some((color, piece));
                piece_bb[color.index()][piece.index()] |= sq.bit();
                color_bb[color.index()] |= sq.bit();
                if piece == Piece::King {
                    king_square[color.index()] = sq;
                }
                file += 1;
            }
            if file != 8 {
                return Err(FenError::TooManyFiles { rank, files: file });
            }
        }

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        let mut castling_rights = 0u8;
        if parts[2] != "-" {
            for ch in parts[2].chars() {
                castling_rights |= match ch {
                    'K' => WHITE_KINGSIDE,
                    'Q' => WHITE_QUEENSIDE,
                    'k' => BLACK_KINGSIDE,
                    'q' => BLACK_QUEENSIDE,
                    other => return Err(FenError::InvalidCastling { char: other }),
                };
            }
        }

        let en_passant = if parts[3] == "-" {
            None
        } else {
            Some(Square::from_algebraic(parts[3]).map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?)
        };

        let halfmove_clock = parts.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        let fullmove_number = parts.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);

        let mut pos = Position {
            board,
            piece_bb,
            color_bb,
            side_to_move,
            castling_rights,
            en_passant,
            halfmove_clock,
            fullmove_number,
            hash: 0,
            king_square,
            history: Vec::new(),
        };
        pos.hash = pos.recompute_hash();
        pos.history.push(pos.hash);
        Ok(pos)
    }
}

fn castle_rook_squares(color: Color, side: CastleSide) -> (Square, Square) {
    match (color, side) {
        (Color::White, CastleSide::King) => (Square(H1), Square(5)),
        (Color::White, CastleSide::Queen) => (Square(A1), Square(3)),
        (Color::Black, CastleSide::King) => (Square(H8), Square(61)),
        (Color::Black, CastleSide::Queen) => (Square(A8), Square(59)),
        (_, CastleSide::None) => unreachable!("castle_rook_squares called for a non-castling move"),
    }
}

/// White pawns on the rank below `sq`, offset one file either way, attack
/// `sq`; symmetric for black one rank above.
fn pawn_attackers(sq: Square, by: Color, pawns: u64) -> u64 {
    let rank = sq.rank() as i32;
    let file = sq.file() as i32;
    let source_rank = match by {
        Color::White => rank - 1,
        Color::Black => rank + 1,
    };
    if !(0..8).contains(&source_rank) {
        return 0;
    }
    let mut mask = 0u64;
    for df in [-1, 1] {
        let f = file + df;
        if (0..8).contains(&f) {
            mask |= Square::new(source_rank as usize, f as usize).bit();
        }
    }
    mask & pawns
}

fn piece_from_char(ch: char) -> Option<(Color, Piece)> {
    let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
    let piece = match ch.to_ascii_lowercase() {
        'p' => Piece::Pawn,
        'n' => Piece::Knight,
        'b' => Piece::Bishop,
        'r' => Piece::Rook,
        'q' => Piece::Queen,
        'k' => Piece::King,
        _ => return None,
    };
    Some((color, piece))
}

fn piece_char(color: Color, piece: Piece) -> char {
    let ch = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    if color == Color::White {
        ch.to_ascii_uppercase()
    } else {
        ch
    }
}

pub const STARTPOS_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_round_trips_through_fen() {
        let pos = Position::new_game();
        assert_eq!(pos.to_fen(), STARTPOS_FEN);
    }

    #[test]
    fn make_unmake_restores_hash_and_board() {
        let mut pos = Position::new_game();
        let before = pos.clone();
        let m = Move::new(
            Square::from_algebraic("e2").unwrap(),
            Square::from_algebraic("e4").unwrap(),
            None,
            None,
            false,
            true,
            CastleSide::None,
        );
        let undo = pos.make_move(m);
        assert!(undo.valid);
        pos.unmake_move(m, undo);
        assert_eq!(pos.hash, before.hash);
        assert_eq!(pos.board, before.board);
        assert_eq!(pos.castling_rights, before.castling_rights);
    }

    #[test]
    fn hash_matches_recomputation_after_a_move() {
        let mut pos = Position::new_game();
        let m = Move::new(
            Square::from_algebraic("e2").unwrap(),
            Square::from_algebraic("e4").unwrap(),
            None,
            None,
            false,
            true,
            CastleSide::None,
        );
        pos.make_move(m);
        assert_eq!(pos.hash, pos.recompute_hash());
    }

    #[test]
    fn mirrored_startpos_is_still_startpos() {
        let pos = Position::new_game();
        let mirrored = pos.mirrored();
        assert_eq!(mirrored.to_fen(), STARTPOS_FEN);
    }

    #[test]
    fn mirrored_swaps_castling_rights() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w K - 0 1").unwrap();
        let mirrored = pos.mirrored();
        assert_eq!(mirrored.castling_rights, BLACK_KINGSIDE);
    }

    #[test]
    fn kiwipete_fen_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
    }
}
