#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use mimalloc::MiMalloc;
use std::time::Instant;

use crate::board::Board;
use crate::move_generator::{generate, GenType};

pub mod board;
pub mod castling;
pub mod evaluation;
pub mod move_generator;
pub mod movelist;
pub mod permute;
pub mod piece;
pub mod search;
pub mod shell;
pub mod square;
pub mod r#move;
mod history;

pub fn perft(depth: u32, fen: Option<String>) {
    println!("perft");
    let mut board = match fen {
        None => Board::new(),
        Some(f) => match Board::from_fen(&f) {
            Ok(b) => b,
            Err(msg) => {
                eprintln!("bad FEN: {}", msg);
                return;
            }
        },
    };
    println!("{}\n", board);
    println!("depth nodes\n--------");
    for d in 0..depth + 1 {
        let start = Instant::now();
        let nodes = _perft(&mut board, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
}

// Generation is pseudo-legal, so nodes only count once make accepts them
fn _perft(board: &mut Board, depth: u32) -> u128 {
    if depth == 0 {
        return 1;
    }
    let moves = generate(board, GenType::PseudoLegal);
    let mut nodes: u128 = 0u128;
    for mv in &moves {
        if !board.make(*mv) {
            continue;
        }
        nodes += _perft(board, depth - 1);
        board.unmake()
    }
    nodes
}
