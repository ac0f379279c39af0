use crate::{
    board::Board,
    evaluation::Score,
    movelist::MoveList,
    piece::Color::{Dark, Light},
    piece::{Color, PieceType},
    r#move::{self, Move},
    square::{file_of, Square},
};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub enum GenType {
    PseudoLegal,
    Captures,
}

// Movement tables, shared with the attack scan and the mobility counter.
// Stepping off the board lands on a -1 sentinel in the padded 10x12 array
// instead of needing bounds checks.
pub(crate) const SLIDES: [bool; 6] = [false, false, true, true, true, false];
pub(crate) const OFFSET_COUNT: [usize; 6] = [0, 8, 4, 4, 8, 8];
pub(crate) const OFFSET: [[i32; 8]; 6] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [-21, -19, -12, -8, 8, 12, 19, 21],
    [-11, -9, 9, 11, 0, 0, 0, 0],
    [-10, -1, 1, 10, 0, 0, 0, 0],
    [-11, -10, -9, -1, 1, 9, 10, 11],
    [-11, -10, -9, -1, 1, 9, 10, 11],
];

pub(crate) const MAILBOX: [i32; 120] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1,  0,  1,  2,  3,  4,  5,  6,  7, -1,
    -1,  8,  9, 10, 11, 12, 13, 14, 15, -1,
    -1, 16, 17, 18, 19, 20, 21, 22, 23, -1,
    -1, 24, 25, 26, 27, 28, 29, 30, 31, -1,
    -1, 32, 33, 34, 35, 36, 37, 38, 39, -1,
    -1, 40, 41, 42, 43, 44, 45, 46, 47, -1,
    -1, 48, 49, 50, 51, 52, 53, 54, 55, -1,
    -1, 56, 57, 58, 59, 60, 61, 62, 63, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
];

pub(crate) const MAILBOX64: [usize; 64] = [
    21, 22, 23, 24, 25, 26, 27, 28,
    31, 32, 33, 34, 35, 36, 37, 38,
    41, 42, 43, 44, 45, 46, 47, 48,
    51, 52, 53, 54, 55, 56, 57, 58,
    61, 62, 63, 64, 65, 66, 67, 68,
    71, 72, 73, 74, 75, 76, 77, 78,
    81, 82, 83, 84, 85, 86, 87, 88,
    91, 92, 93, 94, 95, 96, 97, 98,
];

/// Generates pseudo-legal moves for the side to move, in board-scan order.
/// `Captures` restricts the output to capturing and promoting moves.
/// Castling is emitted whenever the rights bit is set; path legality is
/// checked when the move is made, not here.
pub fn generate(board: &Board, gen_type: GenType) -> MoveList {
    let mut list = MoveList::default();
    let side = board.side_to_move();
    let xside = side.opposite();

    for i in 0..64usize {
        let p = match board.piece_on(i) {
            Some(p) if p.color == side => p,
            _ => continue,
        };
        if p.piece_type == PieceType::Pawn {
            pawn_moves(board, &mut list, i, side, gen_type);
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
                    match board.color_on(next) {
                        Some(c) => {
                            if c == xside {
                                push_move(&mut list, side, i, next, r#move::CAPTURE);
                            }
                            break;
                        }
                        None => {
                            if gen_type == GenType::PseudoLegal {
                                push_move(&mut list, side, i, next, 0);
                            }
                        }
                    }
                    if !SLIDES[pt] {
                        break;
                    }
                    n = next;
                }
            }
        }
    }

    if gen_type == GenType::PseudoLegal {
        castle_moves(board, &mut list, side);
    }
    en_passant_moves(board, &mut list, side);
    list
}

fn pawn_moves(board: &Board, list: &mut MoveList, i: Square, side: Color, gen_type: GenType) {
    let col = file_of(i);
    let at = |sq: i32| -> Option<Color> {
        if (0..64).contains(&sq) {
            board.color_on(sq as usize)
        } else {
            None
        }
    };
    let empty = |sq: i32| (0..64).contains(&sq) && board.color_on(sq as usize).is_none();
    let i = i as i32;

    if side == Light {
        if col != 0 && at(i - 9) == Some(Dark) {
            push_move(list, side, i as usize, (i - 9) as usize, r#move::CAPTURE | r#move::PAWN_MOVE);
        }
        if col != 7 && at(i - 7) == Some(Dark) {
            push_move(list, side, i as usize, (i - 7) as usize, r#move::CAPTURE | r#move::PAWN_MOVE);
        }
        match gen_type {
            GenType::PseudoLegal => {
                if empty(i - 8) {
                    push_move(list, side, i as usize, (i - 8) as usize, r#move::PAWN_MOVE);
                    if i >= 48 && empty(i - 16) {
                        push_move(
                            list,
                            side,
                            i as usize,
                            (i - 16) as usize,
                            r#move::PAWN_MOVE | r#move::DOUBLE_PUSH,
                        );
                    }
                }
            }
            // only pushes that promote are of interest here
            GenType::Captures => {
                if i <= 15 && empty(i - 8) {
                    push_move(list, side, i as usize, (i - 8) as usize, r#move::PAWN_MOVE);
                }
            }
        }
    } else {
        if col != 0 && at(i + 7) == Some(Light) {
            push_move(list, side, i as usize, (i + 7) as usize, r#move::CAPTURE | r#move::PAWN_MOVE);
        }
        if col != 7 && at(i + 9) == Some(Light) {
            push_move(list, side, i as usize, (i + 9) as usize, r#move::CAPTURE | r#move::PAWN_MOVE);
        }
        match gen_type {
            GenType::PseudoLegal => {
                if empty(i + 8) {
                    push_move(list, side, i as usize, (i + 8) as usize, r#move::PAWN_MOVE);
                    if i <= 15 && empty(i + 16) {
                        push_move(
                            list,
                            side,
                            i as usize,
                            (i + 16) as usize,
                            r#move::PAWN_MOVE | r#move::DOUBLE_PUSH,
                        );
                    }
                }
            }
            GenType::Captures => {
                if i >= 48 && empty(i + 8) {
                    push_move(list, side, i as usize, (i + 8) as usize, r#move::PAWN_MOVE);
                }
            }
        }
    }
}

fn castle_moves(board: &Board, list: &mut MoveList, side: Color) {
    use crate::board::{C1, C8, E1, E8, G1, G8};
    let (king_side, queen_side) = board.castling_rights().get(side);
    let (from, kingside_to, queenside_to) = if side == Light {
        (E1, G1, C1)
    } else {
        (E8, G8, C8)
    };
    if king_side {
        push_move(list, side, from, kingside_to, r#move::CASTLE);
    }
    if queen_side {
        push_move(list, side, from, queenside_to, r#move::CASTLE);
    }
}

fn en_passant_moves(board: &Board, list: &mut MoveList, side: Color) {
    let ep = match board.en_passant_target() {
        Some(sq) => sq as i32,
        None => return,
    };
    let bits = r#move::CAPTURE | r#move::EN_PASSANT | r#move::PAWN_MOVE;
    let pawn_at = |sq: i32, color: Color| {
        (0..64).contains(&sq)
            && board.piece_on(sq as usize)
                == Some(crate::piece::Piece {
                    piece_type: PieceType::Pawn,
                    color,
                })
    };
    if side == Light {
        if file_of(ep as usize) != 0 && pawn_at(ep + 7, Light) {
            push_move(list, side, (ep + 7) as usize, ep as usize, bits);
        }
        if file_of(ep as usize) != 7 && pawn_at(ep + 9, Light) {
            push_move(list, side, (ep + 9) as usize, ep as usize, bits);
        }
    } else {
        if file_of(ep as usize) != 0 && pawn_at(ep - 9, Dark) {
            push_move(list, side, (ep - 9) as usize, ep as usize, bits);
        }
        if file_of(ep as usize) != 7 && pawn_at(ep - 7, Dark) {
            push_move(list, side, (ep - 7) as usize, ep as usize, bits);
        }
    }
}

/// Puts a move on the list, expanding pawn moves onto the back rank into
/// one move per promotion candidate.
fn push_move(list: &mut MoveList, side: Color, from: Square, to: Square, bits: u32) {
    if bits & r#move::PAWN_MOVE != 0 {
        let back_rank_reached = match side {
            Light => to <= 7,
            Dark => to >= 56,
        };
        if back_rank_reached {
            for promote_to in PieceType::PROMOTABLE {
                list.push(Move::new_promotion(from, to, promote_to, bits));
            }
            return;
        }
    }
    list.push(Move::new(from, to, bits));
}

/// Ordering score assigned at generation time: captures by MVV/LVA above
/// everything else, promotions by the promoted piece's worth, quiet moves
/// at zero (the search layers its history table on top of this).
pub fn generation_score(board: &Board) -> impl Fn(&Move) -> Score + '_ {
    move |m| {
        if let Some(promoted) = m.promotion_target() {
            1_000_000 + 10 * promoted.value()
        } else if let Some(victim) = m.is_capture().then(|| board.piece_type_on(m.target())).flatten() {
            let attacker = board.piece_type_on(m.origin()).map_or(0, |a| a.value());
            1_000_000 + 10 * victim.value() - attacker
        } else {
            0
        }
    }
}

#[cfg(test)]
mod perft_tests {
    use super::{generate, GenType};
    use crate::board::Board;

    // Node counts are from the chess programming wiki. Since generation is
    // pseudo-legal, every move is vetted through make before it counts.
    const TEST_POSITIONS: [(&str, [u64; 3]); 4] = [
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            [20, 400, 8902],
        ),
        (
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            [48, 2039, 97862],
        ),
        (
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            [14, 191, 2812],
        ),
        (
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            [44, 1486, 62379],
        ),
    ];

    #[test]
    fn perft_verification() {
        for (fen, results) in TEST_POSITIONS {
            let mut board = Board::from_fen(fen).unwrap();
            for d in 1..=3 {
                assert_eq!(results[d - 1], perft(&mut board, d), "{} at depth {}", fen, d);
            }
        }
    }

    #[test]
    fn perft_start_position_depth_4() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 4), 197_281);
    }

    #[test]
    fn capture_generation_is_a_subset_of_full_generation() {
        let board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let all = generate(&board, GenType::PseudoLegal);
        let captures = generate(&board, GenType::Captures);
        assert!(!captures.is_empty());
        for m in &captures {
            assert!(m.is_capture() || m.promotion_target().is_some());
            assert!(all.contains(m));
        }
    }

    // perft with legality filtering at every level
    fn perft(board: &mut Board, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = generate(board, GenType::PseudoLegal);
        let mut nodes = 0;
        for m in &moves {
            if !board.make(*m) {
                continue;
            }
            nodes += perft(board, depth - 1);
            board.unmake();
        }
        nodes
    }
}
