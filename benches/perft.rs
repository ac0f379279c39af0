use criterion::{criterion_group, criterion_main, Criterion};
use pangolin::board::Board;
use pangolin::move_generator::{generate, GenType};

// A pure perft function, with no node counting, simply make/unmake and
// move generation. Generation is pseudo-legal, so every move is probed.
fn perft(board: &mut Board, depth: u64) {
    if depth == 0 {
        return;
    }
    for m in &generate(board, GenType::PseudoLegal) {
        if !board.make(*m) {
            continue;
        }
        perft(board, depth - 1);
        board.unmake();
    }
}

fn perft_bench(c: &mut Criterion) {
    // The positions are taken from the chess programming wiki
    // https://www.chessprogramming.org/Perft_Results
    let mut board = Board::new();
    c.bench_function("perft initial 4", |b| b.iter(|| perft(&mut board, 4)));
    board = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
        .unwrap();
    c.bench_function("perft kiwipete 3", |b| b.iter(|| perft(&mut board, 3)));
    board = Board::from_fen("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10")
        .unwrap();
    c.bench_function("perft alternative 3", |b| b.iter(|| perft(&mut board, 3)));
}

criterion_group!(benches, perft_bench);
criterion_main!(benches);
