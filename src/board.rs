use crate::castling::CastlingRights;
use crate::history::HistoryEntry;
use crate::move_generator::{generate, generation_score, GenType, MAILBOX, MAILBOX64, OFFSET, OFFSET_COUNT, SLIDES};
use crate::movelist::MoveList;
use crate::piece::Color::{Dark, Light};
use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use crate::piece::{Color, Piece, PieceType};
use crate::r#move::Move;
use crate::square::{file_of, parse_square, square_representation, Square};
use std::fmt::{Display, Formatter};

// Named squares involved in castling
pub const A1: Square = 56;
pub const B1: Square = 57;
pub const C1: Square = 58;
pub const D1: Square = 59;
pub const E1: Square = 60;
pub const F1: Square = 61;
pub const G1: Square = 62;
pub const H1: Square = 63;
pub const A8: Square = 0;
pub const B8: Square = 1;
pub const C8: Square = 2;
pub const D8: Square = 3;
pub const E8: Square = 4;
pub const F8: Square = 5;
pub const G8: Square = 6;
pub const H8: Square = 7;

const BACK_RANK: [PieceType; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

#[derive(Clone)]
pub struct Board {
    // Squares are indexed rank-major from the top: 0 is a8, 63 is h1
    pieces: [Option<Piece>; 64],
    side_to_move: Color,
    castling_rights: CastlingRights,
    ep_target: Option<Square>,
    fifty: u32,

    history_entries: Vec<HistoryEntry>,
}

impl Board {
    /// Creates a board set up for the start of a game, light to move
    pub fn new() -> Board {
        let mut pieces = [None; 64];
        for file in 0..8 {
            pieces[file] = Some(Piece {
                piece_type: BACK_RANK[file],
                color: Dark,
            });
            pieces[8 + file] = Some(Piece {
                piece_type: Pawn,
                color: Dark,
            });
            pieces[48 + file] = Some(Piece {
                piece_type: Pawn,
                color: Light,
            });
            pieces[56 + file] = Some(Piece {
                piece_type: BACK_RANK[file],
                color: Light,
            });
        }
        Board {
            pieces,
            side_to_move: Light,
            castling_rights: CastlingRights::new(),
            ep_target: None,
            fifty: 0,
            history_entries: Vec::with_capacity(128),
        }
    }

    /// Builds a board from its FEN representation
    pub fn from_fen(fen: &str) -> Result<Board, String> {
        let mut sections = fen.split_whitespace();
        let placement = sections.next().ok_or("missing piece placement")?;
        let side = sections.next().ok_or("missing side to move")?;
        let castling = sections.next().unwrap_or("-");
        let ep = sections.next().unwrap_or("-");
        let halfmove = sections.next().unwrap_or("0");

        let mut board = Board {
            pieces: [None; 64],
            side_to_move: Light,
            castling_rights: CastlingRights::none(),
            ep_target: None,
            fifty: 0,
            history_entries: Vec::with_capacity(128),
        };

        let mut sq = 0usize;
        for c in placement.chars() {
            match c {
                '/' => (),
                '1'..='8' => sq += c as usize - '0' as usize,
                _ => {
                    let piece = Piece::from_char(c)
                        .ok_or_else(|| format!("unexpected character in placement: {}", c))?;
                    if sq >= 64 {
                        return Err(String::from("piece placement overflows the board"));
                    }
                    board.pieces[sq] = Some(piece);
                    sq += 1;
                }
            }
        }
        if sq != 64 {
            return Err(String::from("piece placement does not cover the board"));
        }

        board.side_to_move = match side {
            "w" => Light,
            "b" => Dark,
            _ => return Err(format!("bad side to move: {}", side)),
        };
        board.castling_rights = CastlingRights::from_str(castling);
        board.ep_target = parse_square(ep);
        board.fifty = halfmove
            .parse::<u32>()
            .map_err(|_| format!("bad halfmove clock: {}", halfmove))?;
        Ok(board)
    }

    /// Makes a move if it is legal. If the mover would be left in check, or
    /// a castle fails its path conditions, the board is unchanged and
    /// `false` is returned.
    pub fn make(&mut self, m: Move) -> bool {
        let side = self.side_to_move;
        let xside = side.opposite();

        // Castling is vetted before anything is touched: the king must not
        // currently be in check, and the transit squares must be empty and
        // safe. The rook moves here, the king through the shared path below.
        if m.is_castle() {
            if self.in_check(side) {
                return false;
            }
            let (rook_from, rook_to) = match m.target() {
                G1 => {
                    if self.pieces[F1].is_some()
                        || self.pieces[G1].is_some()
                        || self.attacked(F1, xside)
                        || self.attacked(G1, xside)
                    {
                        return false;
                    }
                    (H1, F1)
                }
                C1 => {
                    if self.pieces[B1].is_some()
                        || self.pieces[C1].is_some()
                        || self.pieces[D1].is_some()
                        || self.attacked(C1, xside)
                        || self.attacked(D1, xside)
                    {
                        return false;
                    }
                    (A1, D1)
                }
                G8 => {
                    if self.pieces[F8].is_some()
                        || self.pieces[G8].is_some()
                        || self.attacked(F8, xside)
                        || self.attacked(G8, xside)
                    {
                        return false;
                    }
                    (H8, F8)
                }
                C8 => {
                    if self.pieces[B8].is_some()
                        || self.pieces[C8].is_some()
                        || self.pieces[D8].is_some()
                        || self.attacked(C8, xside)
                        || self.attacked(D8, xside)
                    {
                        return false;
                    }
                    (A8, D8)
                }
                _ => panic!("malformed castle move: {}", m),
            };
            if let Some(rook) = self.remove_piece(rook_from) {
                self.add_piece(rook, rook_to);
            }
        }

        self.history_entries.push(HistoryEntry {
            move_played: m,
            captured_piece: self.pieces[m.target()],
            ep_target: self.ep_target,
            castling_rights: self.castling_rights,
            fifty: self.fifty,
        });

        self.castling_rights.update(m.origin(), m.target());
        self.ep_target = if m.is_double_push() {
            Some(if side == Light {
                m.target() + 8
            } else {
                m.target() - 8
            })
        } else {
            None
        };
        if m.is_pawn_move() || m.is_capture() {
            self.fifty = 0;
        } else {
            self.fifty += 1;
        }

        let moved = self
            .remove_piece(m.origin())
            .expect("no piece on the origin square of a move");
        self.remove_piece(m.target());
        let placed = match m.promotion_target() {
            Some(piece_type) => Piece {
                piece_type,
                color: side,
            },
            None => moved,
        };
        self.add_piece(placed, m.target());

        if m.is_en_passant() {
            let captured_sq = if side == Light {
                m.target() + 8
            } else {
                m.target() - 8
            };
            self.remove_piece(captured_sq);
        }

        self.side_to_move = xside;
        if self.in_check(side) {
            self.unmake();
            return false;
        }
        true
    }

    /// Given a string, makes the move if it is legal
    pub fn make_from_str(&mut self, move_str: &str) -> Result<(), String> {
        let (origin, target, promotion_target) = if let Some(mv) = Move::parse(move_str) {
            mv
        } else {
            return Err(String::from("Move is not formatted correctly"));
        };

        let candidates = generate(self, GenType::PseudoLegal);
        for mv in &candidates {
            if mv.origin() == origin
                && mv.target() == target
                && mv.promotion_target() == promotion_target
            {
                return if self.make(*mv) {
                    Ok(())
                } else {
                    Err(String::from("Illegal move"))
                };
            }
        }
        Err(String::from("Illegal move"))
    }

    /// Unmakes the move on the top of the history stack. Calling this with
    /// no move to undo is a caller bug and aborts.
    pub fn unmake(&mut self) {
        let entry = self
            .history_entries
            .pop()
            .expect("unmake called with no move to undo");
        let m = entry.move_played;

        self.side_to_move = self.side_to_move.opposite();
        let side = self.side_to_move;
        let xside = side.opposite();

        self.castling_rights = entry.castling_rights;
        self.ep_target = entry.ep_target;
        self.fifty = entry.fifty;

        let moved = self.remove_piece(m.target());
        let restored = if m.promotion_target().is_some() {
            Piece {
                piece_type: Pawn,
                color: side,
            }
        } else {
            moved.expect("no piece on the target square of an undone move")
        };
        self.add_piece(restored, m.origin());
        if let Some(captured) = entry.captured_piece {
            self.add_piece(captured, m.target());
        }

        if m.is_castle() {
            let (rook_from, rook_to) = match m.target() {
                G1 => (F1, H1),
                C1 => (D1, A1),
                G8 => (F8, H8),
                C8 => (D8, A8),
                _ => panic!("malformed castle move: {}", m),
            };
            self.remove_piece(rook_from);
            self.add_piece(
                Piece {
                    piece_type: Rook,
                    color: side,
                },
                rook_to,
            );
        }
        if m.is_en_passant() {
            let captured_sq = if side == Light {
                m.target() + 8
            } else {
                m.target() - 8
            };
            self.add_piece(
                Piece {
                    piece_type: Pawn,
                    color: xside,
                },
                captured_sq,
            );
        }
    }

    /// Places a new piece on a given square
    pub(crate) fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.pieces[sq] = Some(piece);
    }

    /// Clears the given square, returning the piece that has been removed if any
    pub(crate) fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.pieces[sq].take()
    }

    /*
    INTERESTING GETTERS
     */
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.ep_target
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    /// Half-moves since the last capture or pawn move
    pub fn halfmove_clock(&self) -> u32 {
        self.fifty
    }

    /// Number of moves made on this board and not yet unmade
    pub fn ply(&self) -> usize {
        self.history_entries.len()
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.pieces[sq]
    }

    pub fn piece_type_on(&self, sq: Square) -> Option<PieceType> {
        self.pieces[sq].map(|p| p.piece_type)
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.pieces[sq].map(|p| p.color)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces.iter().position(|p| {
            *p == Some(Piece {
                piece_type: King,
                color,
            })
        })
    }

    /// All pseudo-legal moves for the side to move, best generation score
    /// first. Every move still has to be vetted through `make`.
    pub fn legal_moves(&self) -> MoveList {
        let moves = generate(self, GenType::PseudoLegal);
        let mut ordered = MoveList::default();
        for m in moves.best_first_iter(&generation_score(self)) {
            ordered.push(*m);
        }
        ordered
    }

    /// Whether any piece of `attacking_side` pseudo-legally reaches `sq`.
    /// Pawns are probed on their capture diagonals, never their pushes.
    pub fn attacked(&self, sq: Square, attacking_side: Color) -> bool {
        for i in 0..64usize {
            let p = match self.pieces[i] {
                Some(p) if p.color == attacking_side => p,
                _ => continue,
            };
            if p.piece_type == Pawn {
                let (west, east) = if attacking_side == Light {
                    (i as i32 - 9, i as i32 - 7)
                } else {
                    (i as i32 + 7, i as i32 + 9)
                };
                if file_of(i) != 0 && west == sq as i32 {
                    return true;
                }
                if file_of(i) != 7 && east == sq as i32 {
                    return true;
                }
            } else {
                let pt = p.piece_type as usize;
                for j in 0..OFFSET_COUNT[pt] {
                    let mut n = i;
                    loop {
                        let next = MAILBOX[(MAILBOX64[n] as i32 + OFFSET[pt][j]) as usize];
                        if next < 0 {
                            break;
                        }
                        let next = next as usize;
                        if next == sq {
                            return true;
                        }
                        if self.pieces[next].is_some() {
                            break;
                        }
                        if !SLIDES[pt] {
                            break;
                        }
                        n = next;
                    }
                }
            }
        }
        false
    }

    /// Locates the given side's king and asks whether the opponent reaches it
    pub fn in_check(&self, side: Color) -> bool {
        match self.king_square(side) {
            Some(sq) => self.attacked(sq, side.opposite()),
            // A board with no king is already broken, treat it as checked
            None => true,
        }
    }

    /// Counts how many times the current position occurred within the
    /// reversible-move window, using John Stanback's multiset trick over
    /// move origins and destinations. Purely a heuristic counter: it never
    /// looks past the last `halfmove_clock` entries.
    pub fn repetitions(&self) -> u32 {
        if self.fifty <= 3 {
            return 0;
        }
        let hply = self.history_entries.len();
        let window = (self.fifty as usize).min(hply);

        let mut b = [0i32; 64];
        let mut c = 0i32; // squares that differ from the current position
        let mut r = 0u32;
        for entry in self.history_entries[hply - window..].iter().rev() {
            let m = entry.move_played;
            b[m.origin()] += 1;
            if b[m.origin()] == 0 {
                c -= 1;
            } else {
                c += 1;
            }
            b[m.target()] -= 1;
            if b[m.target()] == 0 {
                c -= 1;
            } else {
                c += 1;
            }
            if c == 0 {
                r += 1;
            }
        }
        r
    }

    /*
    FEN SERIALIZATION
     */
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in 0..8 {
            let mut empty_counter = 0;
            for file in 0..8 {
                match self.pieces[rank * 8 + file] {
                    Some(p) => {
                        if empty_counter != 0 {
                            fen.push_str(&empty_counter.to_string());
                        }
                        empty_counter = 0;
                        fen.push_str(&p.to_string());
                    }
                    None => empty_counter += 1,
                }
            }
            if empty_counter != 0 {
                fen.push_str(&empty_counter.to_string());
            }
            if rank != 7 {
                fen.push('/');
            }
        }

        fen.push_str(if self.side_to_move == Light { " w " } else { " b " });
        fen.push_str(&self.castling_rights.to_string());
        match self.ep_target {
            Some(sq) => {
                fen.push(' ');
                fen.push_str(&square_representation(sq).unwrap_or_else(|| String::from("-")));
                fen.push(' ');
            }
            None => fen.push_str(" - "),
        }
        fen.push_str(&(self.fifty.to_string() + " "));
        fen.push_str(&(self.history_entries.len() / 2 + 1).to_string());
        fen
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for rank in 0..8 {
            write!(f, "{} ", 8 - rank)?;
            for file in 0..8 {
                match self.pieces[rank * 8 + file] {
                    None => write!(f, " .")?,
                    Some(p) => write!(f, " {}", p)?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "\n   a b c d e f g h\n")?;
        write!(f, "fen: {}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn signature(board: &Board) -> (String, usize) {
        (board.to_fen(), board.ply())
    }

    fn random_legal_move(board: &mut Board, rng: &mut StdRng) -> Option<Move> {
        let moves = board.legal_moves();
        let mut legal = vec![];
        for m in &moves {
            if board.make(*m) {
                board.unmake();
                legal.push(*m);
            }
        }
        if legal.is_empty() {
            None
        } else {
            Some(legal[rng.gen_range(0..legal.len())])
        }
    }

    #[test]
    fn start_position_fen_roundtrip() {
        let board = Board::new();
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        let parsed = Board::from_fen(&board.to_fen()).unwrap();
        assert_eq!(parsed.to_fen(), board.to_fen());
    }

    #[test]
    fn make_then_unmake_restores_every_field() {
        let mut total_plies = 0;
        for seed in 0..20 {
            let mut board = Board::new();
            let mut rng = StdRng::seed_from_u64(seed);
            loop {
                let before = signature(&board);
                let m = match random_legal_move(&mut board, &mut rng) {
                    Some(m) => m,
                    None => break,
                };
                assert!(board.make(m));
                board.unmake();
                assert_eq!(signature(&board), before, "unmake failed after {}", m);

                // now actually play the move and keep going
                assert!(board.make(m));
                total_plies += 1;
                if board.halfmove_clock() >= 100 {
                    break;
                }
            }
            // unwind the whole game back to the initial position
            while board.ply() > 0 {
                board.unmake();
            }
            assert_eq!(
                board.to_fen(),
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            );
            if total_plies >= 250 {
                break;
            }
        }
        assert!(total_plies >= 200);
    }

    #[test]
    fn no_accepted_move_leaves_own_king_attacked() {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mover = board.side_to_move();
            let m = match random_legal_move(&mut board, &mut rng) {
                Some(m) => m,
                None => break,
            };
            assert!(board.make(m));
            assert!(
                !board.in_check(mover),
                "move {} left the mover in check",
                m
            );
        }
    }

    fn castle_move(board: &Board) -> Option<Move> {
        board
            .legal_moves()
            .iter()
            .copied()
            .find(|m| m.is_castle() && m.target() == G1)
    }

    #[test]
    fn castling_accepted_when_every_condition_holds() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let m = castle_move(&board).expect("castle should be generated");
        assert!(board.make(m));
        assert_eq!(board.piece_type_on(G1), Some(King));
        assert_eq!(board.piece_type_on(F1), Some(Rook));
    }

    #[test]
    fn castling_not_generated_without_the_rights_bit() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
        assert!(castle_move(&board).is_none());
    }

    #[test]
    fn castling_rejected_while_in_check() {
        let mut board = Board::from_fen("4k3/8/8/8/8/4r3/8/4K2R w K - 0 1").unwrap();
        let m = castle_move(&board).expect("castle should be generated");
        assert!(!board.make(m));
        assert_eq!(board.piece_type_on(E1), Some(King));
    }

    #[test]
    fn castling_rejected_through_an_occupied_square() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4KB1R w K - 0 1").unwrap();
        let m = castle_move(&board).expect("castle should be generated");
        let before = board.to_fen();
        assert!(!board.make(m));
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn castling_rejected_through_an_attacked_square() {
        let mut board = Board::from_fen("4k3/8/8/8/8/5r2/8/4K2R w K - 0 1").unwrap();
        let m = castle_move(&board).expect("castle should be generated");
        assert!(!board.make(m));
        assert_eq!(board.piece_type_on(E1), Some(King));
    }

    fn count_legal(board: &mut Board) -> usize {
        let moves = board.legal_moves();
        let mut n = 0;
        for m in &moves {
            if board.make(*m) {
                board.unmake();
                n += 1;
            }
        }
        n
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut board = Board::new();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            board.make_from_str(mv).unwrap();
        }
        assert_eq!(board.side_to_move(), Light);
        assert!(board.in_check(Light));
        assert_eq!(count_legal(&mut board), 0);
    }

    #[test]
    fn boxed_king_is_stalemated() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.in_check(Dark));
        assert_eq!(count_legal(&mut board), 0);
    }

    #[test]
    fn en_passant_capture_and_undo() {
        let mut board = Board::from_fen(
            "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        let before = board.to_fen();
        board.make_from_str("d4e3").unwrap();
        // the captured pawn is gone from e4
        assert_eq!(board.piece_type_on(36), None);
        board.unmake();
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn knight_shuffle_counts_a_repetition() {
        let mut board = Board::new();
        for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            board.make_from_str(mv).unwrap();
        }
        assert_eq!(board.repetitions(), 1);
        assert_eq!(board.halfmove_clock(), 4);
    }

    #[test]
    #[should_panic]
    fn unmake_on_a_fresh_board_is_fatal() {
        let mut board = Board::new();
        board.unmake();
    }

    #[test]
    fn rook_capture_drops_the_castling_right() {
        let mut board =
            Board::from_fen("4k3/8/8/8/8/8/6b1/4K2R b K - 0 1").unwrap();
        board.make_from_str("g2h1").unwrap();
        assert_eq!(board.castling_rights().get(Light), (false, false));
    }

    #[test]
    fn promotion_swaps_the_pawn_for_the_chosen_piece() {
        let mut board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        board.make_from_str("a7a8q").unwrap();
        assert_eq!(board.piece_type_on(A8), Some(Queen));
        board.unmake();
        assert_eq!(board.piece_type_on(8), Some(Pawn));
        assert_eq!(board.piece_type_on(A8), None);
    }
}
