use crate::board::Board;
use crate::move_generator::{MAILBOX, MAILBOX64, OFFSET, OFFSET_COUNT, SLIDES};
use crate::piece::Color::{Dark, Light};
use crate::piece::PieceType;
use crate::square::{file_of, mirror, rank_of};

pub type Score = i32;

pub const DOUBLED_PAWN_PENALTY: Score = 10;
pub const ISOLATED_PAWN_PENALTY: Score = 20;
pub const BACKWARDS_PAWN_PENALTY: Score = 8;
pub const PASSED_PAWN_BONUS: Score = 20;
pub const ROOK_SEMI_OPEN_FILE_BONUS: Score = 10;
pub const ROOK_OPEN_FILE_BONUS: Score = 15;
pub const ROOK_ON_SEVENTH_BONUS: Score = 20;
pub const CHECK_BONUS: Score = 100;

// Below this much non-pawn material, the opponent's king is scored with the
// endgame table.
const ENDGAME_MATERIAL: Score = 1200;

// Every piece-square contribution is lifted by this much so a lone table
// lookup never drags the positional term negative.
const PCSQ_OFFSET: Score = 40;

// The piece-square tables are written from light's point of view, index 0
// being a8. Dark lookups go through `mirror`.
#[rustfmt::skip]
const PAWN_PCSQ: [Score; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  15,  20,  20,  15,  10,   5,
      4,   8,  12,  16,  16,  12,   8,   4,
      3,   6,   9,  12,  12,   9,   6,   3,
      2,   4,   6,   8,   8,   6,   4,   2,
      1,   2,   3, -10, -10,   3,   2,   1,
      0,   0,   0, -40, -40,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_PCSQ: [Score; 64] = [
    -10, -10, -10, -10, -10, -10, -10, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10, -30, -10, -10, -10, -10, -30, -10,
];

#[rustfmt::skip]
const BISHOP_PCSQ: [Score; 64] = [
    -10, -10, -10, -10, -10, -10, -10, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10, -10, -20, -10, -10, -20, -10, -10,
];

#[rustfmt::skip]
const KING_PCSQ: [Score; 64] = [
    -40, -40, -40, -40, -40, -40, -40, -40,
    -40, -40, -40, -40, -40, -40, -40, -40,
    -40, -40, -40, -40, -40, -40, -40, -40,
    -40, -40, -40, -40, -40, -40, -40, -40,
    -40, -40, -40, -40, -40, -40, -40, -40,
    -40, -40, -40, -40, -40, -40, -40, -40,
    -20, -20, -20, -20, -20, -20, -20, -20,
      0,  20,  40, -20,   0, -20,  40,  20,
];

#[rustfmt::skip]
const KING_ENDGAME_PCSQ: [Score; 64] = [
      0,  10,  20,  30,  30,  20,  10,   0,
     10,  20,  30,  40,  40,  30,  20,  10,
     20,  30,  40,  50,  50,  40,  30,  20,
     30,  40,  50,  60,  60,  50,  40,  30,
     30,  40,  50,  60,  60,  50,  40,  30,
     20,  30,  40,  50,  50,  40,  30,  20,
     10,  20,  30,  40,  40,  30,  20,  10,
      0,  10,  20,  30,  30,  20,  10,   0,
];

const LIGHT: usize = 0;
const DARK: usize = 1;

// Per-file pawn tracking, one guard file on each side. For light the entry
// holds the largest row (least advanced pawn), for dark the smallest.
struct EvalContext {
    pawn_rank: [[i32; 10]; 2],
    piece_mat: [Score; 2],
    pawn_mat: [Score; 2],
}

/// Static evaluation, scored as dark minus light: positive values favor
/// dark. A single pass accumulates material, pawn structure, piece-square
/// bonuses, rook activity, king safety, pseudo-mobility and a flat bonus
/// against the side standing in check.
pub fn evaluate(board: &Board) -> Score {
    let mut ctx = EvalContext {
        pawn_rank: [[0; 10], [7; 10]],
        piece_mat: [0; 2],
        pawn_mat: [0; 2],
    };

    // first pass: material counts and per-file pawn extents
    for sq in 0..64usize {
        let p = match board.piece_on(sq) {
            Some(p) => p,
            None => continue,
        };
        let c = if p.color == Light { LIGHT } else { DARK };
        if p.piece_type == PieceType::Pawn {
            ctx.pawn_mat[c] += PieceType::Pawn.value();
            let f = file_of(sq) + 1;
            let row = rank_of(sq) as i32;
            if c == LIGHT {
                if ctx.pawn_rank[LIGHT][f] < row {
                    ctx.pawn_rank[LIGHT][f] = row;
                }
            } else if ctx.pawn_rank[DARK][f] > row {
                ctx.pawn_rank[DARK][f] = row;
            }
        } else {
            ctx.piece_mat[c] += p.piece_type.value();
        }
    }

    // second pass: positional terms and mobility
    let mut position = [0 as Score; 2];
    let mut mobility = [0 as Score; 2];
    for sq in 0..64usize {
        let p = match board.piece_on(sq) {
            Some(p) => p,
            None => continue,
        };
        let c = if p.color == Light { LIGHT } else { DARK };
        mobility[c] += piece_mobility(board, sq);

        let col = file_of(sq);
        let row = rank_of(sq);
        if c == LIGHT {
            match p.piece_type {
                PieceType::Pawn => position[LIGHT] += eval_light_pawn(&ctx, sq) + PCSQ_OFFSET,
                PieceType::Knight => position[LIGHT] += KNIGHT_PCSQ[sq] + PCSQ_OFFSET,
                PieceType::Bishop => position[LIGHT] += BISHOP_PCSQ[sq] + PCSQ_OFFSET,
                PieceType::Rook => {
                    if ctx.pawn_rank[LIGHT][col + 1] == 0 {
                        position[LIGHT] += if ctx.pawn_rank[DARK][col + 1] == 7 {
                            ROOK_OPEN_FILE_BONUS
                        } else {
                            ROOK_SEMI_OPEN_FILE_BONUS
                        };
                    }
                    if row == 1 {
                        position[LIGHT] += ROOK_ON_SEVENTH_BONUS;
                    }
                }
                PieceType::King => {
                    position[LIGHT] += if ctx.piece_mat[DARK] <= ENDGAME_MATERIAL {
                        KING_ENDGAME_PCSQ[sq] + PCSQ_OFFSET
                    } else {
                        eval_light_king(&ctx, sq) + PCSQ_OFFSET
                    };
                }
                PieceType::Queen => (),
            }
        } else {
            match p.piece_type {
                PieceType::Pawn => position[DARK] += eval_dark_pawn(&ctx, sq) + PCSQ_OFFSET,
                PieceType::Knight => position[DARK] += KNIGHT_PCSQ[mirror(sq)] + PCSQ_OFFSET,
                PieceType::Bishop => position[DARK] += BISHOP_PCSQ[mirror(sq)] + PCSQ_OFFSET,
                PieceType::Rook => {
                    if ctx.pawn_rank[DARK][col + 1] == 7 {
                        position[DARK] += if ctx.pawn_rank[LIGHT][col + 1] == 0 {
                            ROOK_OPEN_FILE_BONUS
                        } else {
                            ROOK_SEMI_OPEN_FILE_BONUS
                        };
                    }
                    if row == 6 {
                        position[DARK] += ROOK_ON_SEVENTH_BONUS;
                    }
                }
                PieceType::King => {
                    position[DARK] += if ctx.piece_mat[LIGHT] <= ENDGAME_MATERIAL {
                        KING_ENDGAME_PCSQ[mirror(sq)] + PCSQ_OFFSET
                    } else {
                        eval_dark_king(&ctx, sq) + PCSQ_OFFSET
                    };
                }
                PieceType::Queen => (),
            }
        }
    }

    // castling rights and en passant availability count as mobility too
    mobility[LIGHT] += board.castling_rights().count(Light) as Score;
    mobility[DARK] += board.castling_rights().count(Dark) as Score;
    if let Some(ep) = board.en_passant_target() {
        let ep = ep as i32;
        let pawn = |sq: i32, color| {
            (0..64).contains(&sq)
                && board.piece_on(sq as usize)
                    == Some(crate::piece::Piece {
                        piece_type: PieceType::Pawn,
                        color,
                    })
        };
        if file_of(ep as usize) != 0 {
            if pawn(ep + 7, Light) {
                mobility[LIGHT] += 1;
            }
            if pawn(ep - 9, Dark) {
                mobility[DARK] += 1;
            }
        }
        if file_of(ep as usize) != 7 {
            if pawn(ep + 9, Light) {
                mobility[LIGHT] += 1;
            }
            if pawn(ep - 7, Dark) {
                mobility[DARK] += 1;
            }
        }
    }

    // standing in check hands the opponent a flat bonus
    let mut check = [0 as Score; 2];
    if board.in_check(Light) {
        check[DARK] = CHECK_BONUS;
    }
    if board.in_check(Dark) {
        check[LIGHT] = CHECK_BONUS;
    }

    let dark_total =
        ctx.piece_mat[DARK] + ctx.pawn_mat[DARK] + mobility[DARK] + position[DARK] + check[DARK];
    let light_total = ctx.piece_mat[LIGHT]
        + ctx.pawn_mat[LIGHT]
        + mobility[LIGHT]
        + position[LIGHT]
        + check[LIGHT];
    dark_total - light_total
}

/// Number of squares this piece could step to: empty ray squares plus
/// enemy-occupied ray ends, and for pawns their pushes and capture
/// diagonals.
fn piece_mobility(board: &Board, sq: usize) -> Score {
    let p = match board.piece_on(sq) {
        Some(p) => p,
        None => return 0,
    };
    let mut reachable = 0;
    if p.piece_type == PieceType::Pawn {
        let col = file_of(sq);
        let (capture_west, capture_east, push, double, start) = if p.color == Light {
            (sq as i32 - 9, sq as i32 - 7, sq as i32 - 8, sq as i32 - 16, sq >= 48)
        } else {
            (sq as i32 + 7, sq as i32 + 9, sq as i32 + 8, sq as i32 + 16, sq <= 15)
        };
        let enemy = |t: i32| {
            (0..64).contains(&t) && board.color_on(t as usize) == Some(p.color.opposite())
        };
        let empty = |t: i32| (0..64).contains(&t) && board.color_on(t as usize).is_none();
        if col != 0 && enemy(capture_west) {
            reachable += 1;
        }
        if col != 7 && enemy(capture_east) {
            reachable += 1;
        }
        if empty(push) {
            reachable += 1;
            if start && empty(double) {
                reachable += 1;
            }
        }
    } else {
        let pt = p.piece_type as usize;
        for j in 0..OFFSET_COUNT[pt] {
            let mut n = sq;
            loop {
                let next = MAILBOX[(MAILBOX64[n] as i32 + OFFSET[pt][j]) as usize];
                if next < 0 {
                    break;
                }
                let next = next as usize;
                match board.color_on(next) {
                    Some(c) => {
                        if c != p.color {
                            reachable += 1;
                        }
                        break;
                    }
                    None => reachable += 1,
                }
                if !SLIDES[pt] {
                    break;
                }
                n = next;
            }
        }
    }
    reachable
}

fn eval_light_pawn(ctx: &EvalContext, sq: usize) -> Score {
    let mut r = 0;
    let f = file_of(sq) + 1;
    let row = rank_of(sq) as i32;

    r += PAWN_PCSQ[sq];

    // a pawn behind this one on the same file makes it doubled
    if ctx.pawn_rank[LIGHT][f] > row {
        r -= DOUBLED_PAWN_PENALTY;
    }

    // no friendly pawns on either neighboring file: isolated
    if ctx.pawn_rank[LIGHT][f - 1] == 0 && ctx.pawn_rank[LIGHT][f + 1] == 0 {
        r -= ISOLATED_PAWN_PENALTY;
    }
    // not isolated, but trailing both neighbors: backwards
    else if ctx.pawn_rank[LIGHT][f - 1] < row && ctx.pawn_rank[LIGHT][f + 1] < row {
        r -= BACKWARDS_PAWN_PENALTY;
    }

    // no enemy pawn can ever block or take this one: passed
    if ctx.pawn_rank[DARK][f - 1] >= row
        && ctx.pawn_rank[DARK][f] >= row
        && ctx.pawn_rank[DARK][f + 1] >= row
    {
        r += (7 - row) * PASSED_PAWN_BONUS;
    }

    r
}

fn eval_dark_pawn(ctx: &EvalContext, sq: usize) -> Score {
    let mut r = 0;
    let f = file_of(sq) + 1;
    let row = rank_of(sq) as i32;

    r += PAWN_PCSQ[mirror(sq)];

    if ctx.pawn_rank[DARK][f] < row {
        r -= DOUBLED_PAWN_PENALTY;
    }

    if ctx.pawn_rank[DARK][f - 1] == 7 && ctx.pawn_rank[DARK][f + 1] == 7 {
        r -= ISOLATED_PAWN_PENALTY;
    } else if ctx.pawn_rank[DARK][f - 1] > row && ctx.pawn_rank[DARK][f + 1] > row {
        r -= BACKWARDS_PAWN_PENALTY;
    }

    if ctx.pawn_rank[LIGHT][f - 1] <= row
        && ctx.pawn_rank[LIGHT][f] <= row
        && ctx.pawn_rank[LIGHT][f + 1] <= row
    {
        r += row * PASSED_PAWN_BONUS;
    }

    r
}

fn eval_light_king(ctx: &EvalContext, sq: usize) -> Score {
    let mut r = KING_PCSQ[sq];
    let col = file_of(sq);

    // a castled king is judged by the pawn shelter on its wing; a king in
    // the middle by open files around it
    if col < 3 {
        r += eval_lkp(ctx, 1);
        r += eval_lkp(ctx, 2);
        r += eval_lkp(ctx, 3) / 2;
    } else if col > 4 {
        r += eval_lkp(ctx, 8);
        r += eval_lkp(ctx, 7);
        r += eval_lkp(ctx, 6) / 2;
    } else {
        for i in col..=col + 2 {
            if ctx.pawn_rank[LIGHT][i] == 0 && ctx.pawn_rank[DARK][i] == 7 {
                r -= 10;
            }
        }
    }

    // king safety only matters while the opponent has material to attack with
    r *= ctx.piece_mat[DARK];
    r / 3100
}

// pawn-shelter value of the light pawn on file f
fn eval_lkp(ctx: &EvalContext, f: usize) -> Score {
    let mut r = 0;

    if ctx.pawn_rank[LIGHT][f] == 6 {
        // pawn has not moved
    } else if ctx.pawn_rank[LIGHT][f] == 5 {
        r -= 10; // pawn moved one square
    } else if ctx.pawn_rank[LIGHT][f] != 0 {
        r -= 20; // pawn moved further
    } else {
        r -= 25; // no pawn on this file
    }

    if ctx.pawn_rank[DARK][f] == 7 {
        r -= 15; // no enemy pawn either
    } else if ctx.pawn_rank[DARK][f] == 5 {
        r -= 10; // enemy pawn on the 3rd rank
    } else if ctx.pawn_rank[DARK][f] == 4 {
        r -= 5; // enemy pawn on the 4th rank
    }

    r
}

fn eval_dark_king(ctx: &EvalContext, sq: usize) -> Score {
    let mut r = KING_PCSQ[mirror(sq)];
    let col = file_of(sq);

    if col < 3 {
        r += eval_dkp(ctx, 1);
        r += eval_dkp(ctx, 2);
        r += eval_dkp(ctx, 3) / 2;
    } else if col > 4 {
        r += eval_dkp(ctx, 8);
        r += eval_dkp(ctx, 7);
        r += eval_dkp(ctx, 6) / 2;
    } else {
        for i in col..=col + 2 {
            if ctx.pawn_rank[LIGHT][i] == 0 && ctx.pawn_rank[DARK][i] == 7 {
                r -= 10;
            }
        }
    }

    r *= ctx.piece_mat[LIGHT];
    r / 3100
}

fn eval_dkp(ctx: &EvalContext, f: usize) -> Score {
    let mut r = 0;

    if ctx.pawn_rank[DARK][f] == 1 {
        // pawn has not moved
    } else if ctx.pawn_rank[DARK][f] == 2 {
        r -= 10;
    } else if ctx.pawn_rank[DARK][f] != 7 {
        r -= 20;
    } else {
        r -= 25;
    }

    if ctx.pawn_rank[LIGHT][f] == 0 {
        r -= 15;
    } else if ctx.pawn_rank[LIGHT][f] == 2 {
        r -= 10;
    } else if ctx.pawn_rank[LIGHT][f] == 3 {
        r -= 5;
    }

    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(evaluate(&Board::new()), 0);
    }

    #[test]
    fn missing_light_queen_swings_the_score_toward_dark() {
        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1").unwrap();
        assert!(evaluate(&board) > 800);
    }

    // The check bonus goes to the side whose opponent stands in check,
    // on top of the dark-minus-light convention.
    #[test]
    fn light_in_check_raises_the_score_for_dark() {
        let checked =
            Board::from_fen("4k3/8/8/8/4r3/8/8/4K3 w - - 0 1").unwrap();
        let quiet = Board::from_fen("4k3/8/8/8/3r4/8/8/4K3 w - - 0 1").unwrap();
        assert!(checked.in_check(crate::piece::Color::Light));
        assert!(!quiet.in_check(crate::piece::Color::Light));
        let diff = evaluate(&checked) - evaluate(&quiet);
        assert!((90..=110).contains(&diff), "diff was {}", diff);
    }

    #[test]
    fn dark_in_check_lowers_the_score_for_dark() {
        let checked =
            Board::from_fen("4k3/8/8/8/4R3/8/8/4K3 b - - 0 1").unwrap();
        let quiet = Board::from_fen("4k3/8/8/8/3R4/8/8/4K3 b - - 0 1").unwrap();
        assert!(checked.in_check(crate::piece::Color::Dark));
        let diff = evaluate(&checked) - evaluate(&quiet);
        assert!((-110..=-90).contains(&diff), "diff was {}", diff);
    }

    #[test]
    fn passed_pawn_earns_its_bonus() {
        // identical except for the blocking enemy pawn
        let passed = Board::from_fen("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        let blocked = Board::from_fen("4k3/4p3/8/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert!(evaluate(&passed) < evaluate(&blocked) - PASSED_PAWN_BONUS);
    }
}
