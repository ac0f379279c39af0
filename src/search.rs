use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::evaluation::{evaluate, Score};
use crate::move_generator::{generate, generation_score, GenType};
use crate::movelist::MoveList;
use crate::permute::{permute_by_sorting, randomize_in_place, RandomizerChoice};
use crate::r#move::Move;

/// Tree height cap; a line never grows past this many plies, which also
/// bounds the depth the check extension can reach.
pub const MAX_PLY: usize = 32;

/// Mate scores sit at the edge of the search window, shifted by the ply the
/// mate was found at so that shorter mates score more extreme.
pub const MATE: Score = 10_000;

// Boost that pins the principal variation move to the front of the ordering
const PV_BOOST: Score = 10_000_000;

/// Raised by `checkup` once the deadline has passed. Each recursive level
/// hands it straight up; only the `think` driver may absorb it, restoring
/// the board on the way.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SearchTimeout;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchAlgorithm {
    Minimax,
    AlphaBeta,
}

/// Everything a `think` call can be configured with.
/// Avoids passing around a handful of loose arguments.
#[derive(Clone)]
pub struct SearchOptions {
    pub algorithm: SearchAlgorithm,
    pub max_depth: usize,
    pub max_time: Option<Duration>,
    pub verbose: bool,
}
impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            algorithm: SearchAlgorithm::AlphaBeta,
            max_depth: 9,
            max_time: Some(Duration::from_millis(10_000)),
            verbose: false,
        }
    }
}
impl SearchOptions {
    pub fn set_algorithm(&mut self, value: SearchAlgorithm) -> &mut Self {
        self.algorithm = value;
        self
    }
    pub fn set_depth(&mut self, value: usize) -> &mut Self {
        self.max_depth = value;
        self
    }
    pub fn set_time(&mut self, value: Option<Duration>) -> &mut Self {
        self.max_time = value;
        self
    }
    pub fn set_verbose(&mut self, value: bool) -> &mut Self {
        self.verbose = value;
        self
    }
}

/// One line of iterative-deepening progress
pub struct SearchReport {
    pub depth: usize,
    pub nodes: u64,
    pub score: Score,
    pub pv: Vec<Move>,
}
impl Display for SearchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "depth {} nodes {} score {} pv {}",
            self.depth,
            self.nodes,
            self.score,
            self.pv
                .iter()
                .fold(String::new(), |acc, m| format!("{} {}", acc, m))
                .trim()
        )
    }
}

/// Owns the board for the duration of a game and searches it on demand.
/// The principal variation and history tables live here, never as globals,
/// and are wiped at the start of every `think`.
pub struct Search {
    board: Board,
    pv: [[Move; MAX_PLY]; MAX_PLY],
    pv_length: [usize; MAX_PLY],
    follow_pv: bool,
    history: [[Score; 64]; 64],
    ply: usize,
    nodes: u64,
    deadline: Option<Instant>,
}

impl Search {
    pub fn new(board: Board) -> Search {
        Search {
            board,
            pv: [[Move::NONE; MAX_PLY]; MAX_PLY],
            pv_length: [0; MAX_PLY],
            follow_pv: false,
            history: [[0; 64]; 64],
            ply: 0,
            nodes: 0,
            deadline: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
    pub fn into_board(self) -> Board {
        self.board
    }
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// The move to play, from the root of the last completed line.
    /// None when no legal move was found.
    pub fn best_move(&self) -> Option<Move> {
        if self.pv_length[0] > 0 {
            Some(self.pv[0][0])
        } else {
            None
        }
    }

    pub fn principal_variation(&self) -> Vec<Move> {
        self.pv[0][..self.pv_length[0]].to_vec()
    }

    /// Runs iterative deepening until the depth budget is spent or the time
    /// budget expires. Deepening means a timeout costs only the interrupted
    /// depth: the previous depth's line remains the answer, and the board is
    /// restored to its pre-search state before returning.
    pub fn think(&mut self, options: &SearchOptions) {
        self.deadline = options.max_time.map(|limit| Instant::now() + limit);
        self.ply = 0;
        self.nodes = 0;
        self.pv = [[Move::NONE; MAX_PLY]; MAX_PLY];
        self.pv_length = [0; MAX_PLY];
        self.history = [[0; 64]; 64];

        // one extra level on top of the requested depth for the root
        let max_depth = options.max_depth + 1;
        for depth in 1..=max_depth {
            self.follow_pv = true;
            let result = match options.algorithm {
                SearchAlgorithm::AlphaBeta => self.search_max_ab(-MATE, MATE, depth as i32),
                SearchAlgorithm::Minimax => self.search_max(depth as i32),
            };
            match result {
                Ok(score) => {
                    if options.verbose {
                        println!(
                            "{}",
                            SearchReport {
                                depth,
                                nodes: self.nodes,
                                score,
                                pv: self.principal_variation(),
                            }
                        );
                    }
                }
                Err(SearchTimeout) => {
                    // take back the line that was being searched
                    while self.ply != 0 {
                        self.board.unmake();
                        self.ply -= 1;
                    }
                    break;
                }
            }
        }
    }

    /// Picks a random mobile piece of the side to move, using the chosen
    /// permutation algorithm for the ordering, and returns that piece's
    /// first legal move. The board is left untouched.
    pub fn random_move(&mut self, choice: RandomizerChoice) -> Option<Move> {
        let mut rng = rand::thread_rng();
        let side = self.board.side_to_move();
        let mut squares: Vec<usize> = (0..64)
            .filter(|&sq| self.board.color_on(sq) == Some(side))
            .collect();
        match choice {
            RandomizerChoice::KeySort => permute_by_sorting(&mut squares, &mut rng),
            RandomizerChoice::InPlace => randomize_in_place(&mut squares, &mut rng),
        }

        for sq in squares {
            let moves = generate(&self.board, GenType::PseudoLegal);
            for m in &moves {
                if m.origin() != sq {
                    continue;
                }
                if self.board.make(*m) {
                    self.board.unmake();
                    return Some(*m);
                }
            }
        }
        None
    }

    /// Maximizing half of the alpha-beta pair, scoring for dark
    fn search_max_ab(&mut self, mut alpha: Score, beta: Score, mut depth: i32) -> Result<Score, SearchTimeout> {
        self.nodes += 1;
        if self.nodes & 1023 == 0 {
            self.checkup()?;
        }
        self.pv_length[self.ply] = self.ply;

        if depth <= 0 || self.ply >= MAX_PLY - 1 {
            return Ok(evaluate(&self.board));
        }

        let check = self.board.in_check(self.board.side_to_move());
        if check {
            // never stand pat while in check; applied at every ply it recurs
            depth += 1;
        }

        let moves = generate(&self.board, GenType::PseudoLegal);
        let pv_move = if self.follow_pv {
            self.pv_move_to_follow(&moves)
        } else {
            None
        };

        let mut found_move = false;
        let ordered = moves.best_first_iter(&order_score(&self.board, &self.history, pv_move));
        for m in ordered {
            if !self.board.make(*m) {
                continue;
            }
            found_move = true;
            self.ply += 1;
            let x = self.search_min_ab(alpha, beta, depth - 1)?;
            self.board.unmake();
            self.ply -= 1;

            if x > alpha {
                self.history[m.origin()][m.target()] += depth;
                alpha = x;
                self.update_pv(*m);
                if alpha >= beta {
                    return Ok(alpha);
                }
            }
        }

        if !found_move {
            // checkmate or stalemate
            return Ok(if check { -MATE + self.ply as Score } else { 0 });
        }
        if self.board.halfmove_clock() >= 100 {
            return Ok(0);
        }
        Ok(alpha)
    }

    /// Minimizing half of the alpha-beta pair
    fn search_min_ab(&mut self, alpha: Score, mut beta: Score, mut depth: i32) -> Result<Score, SearchTimeout> {
        self.nodes += 1;
        if self.nodes & 1023 == 0 {
            self.checkup()?;
        }
        self.pv_length[self.ply] = self.ply;

        if depth <= 0 || self.ply >= MAX_PLY - 1 {
            return Ok(evaluate(&self.board));
        }

        let check = self.board.in_check(self.board.side_to_move());
        if check {
            depth += 1;
        }

        let moves = generate(&self.board, GenType::PseudoLegal);
        let pv_move = if self.follow_pv {
            self.pv_move_to_follow(&moves)
        } else {
            None
        };

        let mut found_move = false;
        let ordered = moves.best_first_iter(&order_score(&self.board, &self.history, pv_move));
        for m in ordered {
            if !self.board.make(*m) {
                continue;
            }
            found_move = true;
            self.ply += 1;
            let x = self.search_max_ab(alpha, beta, depth - 1)?;
            self.board.unmake();
            self.ply -= 1;

            if x < beta {
                self.history[m.origin()][m.target()] += depth;
                beta = x;
                self.update_pv(*m);
                if beta <= alpha {
                    return Ok(beta);
                }
            }
        }

        if !found_move {
            return Ok(if check { MATE - self.ply as Score } else { 0 });
        }
        if self.board.halfmove_clock() >= 100 {
            return Ok(0);
        }
        Ok(beta)
    }

    /// Pure minimax twin of `search_max_ab`: explores every legal child and
    /// keeps the best value. Exists as the unpruned baseline; both variants
    /// must agree on the root score for any position and depth.
    fn search_max(&mut self, mut depth: i32) -> Result<Score, SearchTimeout> {
        let mut best = -MATE;

        self.nodes += 1;
        if self.nodes & 1023 == 0 {
            self.checkup()?;
        }
        self.pv_length[self.ply] = self.ply;

        if depth <= 0 || self.ply >= MAX_PLY - 1 {
            return Ok(evaluate(&self.board));
        }

        let check = self.board.in_check(self.board.side_to_move());
        if check {
            depth += 1;
        }

        let moves = generate(&self.board, GenType::PseudoLegal);
        let pv_move = if self.follow_pv {
            self.pv_move_to_follow(&moves)
        } else {
            None
        };

        let mut found_move = false;
        let ordered = moves.best_first_iter(&order_score(&self.board, &self.history, pv_move));
        for m in ordered {
            if !self.board.make(*m) {
                continue;
            }
            found_move = true;
            self.ply += 1;
            let x = self.search_min(depth - 1)?;
            self.board.unmake();
            self.ply -= 1;

            if x > best {
                self.history[m.origin()][m.target()] += depth;
                self.update_pv(*m);
                best = x;
            }
        }

        if !found_move {
            return Ok(if check { -MATE + self.ply as Score } else { 0 });
        }
        if self.board.halfmove_clock() >= 100 {
            return Ok(0);
        }
        Ok(best)
    }

    fn search_min(&mut self, mut depth: i32) -> Result<Score, SearchTimeout> {
        let mut best = MATE;

        self.nodes += 1;
        if self.nodes & 1023 == 0 {
            self.checkup()?;
        }
        self.pv_length[self.ply] = self.ply;

        if depth <= 0 || self.ply >= MAX_PLY - 1 {
            return Ok(evaluate(&self.board));
        }

        let check = self.board.in_check(self.board.side_to_move());
        if check {
            depth += 1;
        }

        let moves = generate(&self.board, GenType::PseudoLegal);
        let pv_move = if self.follow_pv {
            self.pv_move_to_follow(&moves)
        } else {
            None
        };

        let mut found_move = false;
        let ordered = moves.best_first_iter(&order_score(&self.board, &self.history, pv_move));
        for m in ordered {
            if !self.board.make(*m) {
                continue;
            }
            found_move = true;
            self.ply += 1;
            let x = self.search_max(depth - 1)?;
            self.board.unmake();
            self.ply -= 1;

            if x < best {
                self.history[m.origin()][m.target()] += depth;
                self.update_pv(*m);
                best = x;
            }
        }

        if !found_move {
            return Ok(if check { MATE - self.ply as Score } else { 0 });
        }
        if self.board.halfmove_clock() >= 100 {
            return Ok(0);
        }
        Ok(best)
    }

    /// While the search is still walking the principal variation from the
    /// previous iteration, find the PV move among the generated moves so the
    /// ordering can put it first. Leaving the PV switches the boost off for
    /// the rest of this iteration.
    fn pv_move_to_follow(&mut self, moves: &MoveList) -> Option<Move> {
        self.follow_pv = false;
        let target = self.pv[0][self.ply];
        if target == Move::NONE {
            return None;
        }
        for m in moves {
            if *m == target {
                self.follow_pv = true;
                return Some(*m);
            }
        }
        None
    }

    /// Records the improving move at the current ply, followed by the best
    /// continuation the child ply found.
    fn update_pv(&mut self, m: Move) {
        let ply = self.ply;
        self.pv[ply][ply] = m;
        for j in ply + 1..self.pv_length[ply + 1] {
            self.pv[ply][j] = self.pv[ply + 1][j];
        }
        self.pv_length[ply] = self.pv_length[ply + 1];
    }

    /// Called every 1024 visited nodes; past the deadline the timeout signal
    /// unwinds the whole search, so the overshoot is bounded by the nodes
    /// visited between two calls.
    fn checkup(&self) -> Result<(), SearchTimeout> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(SearchTimeout),
            _ => Ok(()),
        }
    }
}

/// Move ordering for the search: tactical moves keep their generation score,
/// quiet moves are worth what the history table remembers of them, and the
/// principal variation move is pushed in front of everything.
fn order_score<'a>(
    board: &'a Board,
    history: &'a [[Score; 64]; 64],
    pv_move: Option<Move>,
) -> impl Fn(&Move) -> Score + 'a {
    let base = generation_score(board);
    move |m| {
        let tactical = base(m);
        let mut score = if tactical != 0 {
            tactical
        } else {
            history[m.origin()][m.target()]
        };
        if Some(*m) == pv_move {
            score += PV_BOOST;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::parse_square;

    fn search_for(fen: &str) -> Search {
        Search::new(Board::from_fen(fen).unwrap())
    }

    #[test]
    fn alpha_beta_agrees_with_plain_minimax() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3",
        ];
        for fen in fens {
            for depth in 1..=3 {
                let mut pruned = search_for(fen);
                let mut plain = search_for(fen);
                let ab = pruned.search_max_ab(-MATE, MATE, depth).unwrap();
                let mm = plain.search_max(depth).unwrap();
                assert_eq!(ab, mm, "{} at depth {}", fen, depth);
            }
        }
    }

    #[test]
    fn finds_a_back_rank_mate_in_one() {
        let mut search = search_for("6k1/8/8/8/8/8/r4PPP/6K1 b - - 0 1");
        let score = search.search_max_ab(-MATE, MATE, 2).unwrap();
        assert_eq!(score, MATE - 1);

        let mut search = search_for("6k1/8/8/8/8/8/r4PPP/6K1 b - - 0 1");
        let mut options = SearchOptions::default();
        options.set_depth(2).set_time(None);
        search.think(&options);
        let best = search.best_move().expect("a mate in one must be found");
        assert_eq!(best.origin(), parse_square("a2").unwrap());
        assert_eq!(best.target(), parse_square("a1").unwrap());
    }

    #[test]
    fn exhausted_fifty_move_counter_scores_as_a_draw() {
        // dark is a whole queen up, yet the position is already drawn
        let mut search = search_for("4k3/8/8/8/8/8/8/q3K3 w - - 100 1");
        assert!(evaluate(search.board()) > 800);
        let score = search.search_max_ab(-MATE, MATE, 1).unwrap();
        assert_eq!(score, 0);
    }

    #[test]
    fn tiny_time_budget_still_yields_a_legal_move() {
        let mut search = Search::new(Board::new());
        let before = search.board().to_fen();
        let mut options = SearchOptions::default();
        options.set_depth(25).set_time(Some(Duration::from_millis(1)));

        let started = Instant::now();
        search.think(&options);
        assert!(started.elapsed() < Duration::from_millis(500));

        // the board must come back untouched, and the chosen move must apply
        assert_eq!(search.board().to_fen(), before);
        let best = search.best_move().expect("depth 1 always completes");
        assert!(search.board_mut().make(best));
    }

    #[test]
    fn principal_variation_is_a_playable_line() {
        let mut search = Search::new(Board::new());
        let mut options = SearchOptions::default();
        options.set_depth(3).set_time(None);
        search.think(&options);

        let pv = search.principal_variation();
        assert!(!pv.is_empty());
        let board = search.board_mut();
        let mut made = 0;
        for m in &pv {
            assert!(board.make(*m), "pv move {} is not legal", m);
            made += 1;
        }
        for _ in 0..made {
            board.unmake();
        }
    }

    #[test]
    fn random_move_is_legal_and_leaves_the_board_alone() {
        for choice in [RandomizerChoice::KeySort, RandomizerChoice::InPlace] {
            let mut search = Search::new(Board::new());
            let before = search.board().to_fen();
            let m = search.random_move(choice).expect("start position has moves");
            assert_eq!(search.board().to_fen(), before);
            assert!(search.board_mut().make(m));
        }
    }

    #[test]
    fn mated_side_has_no_best_move() {
        // fool's mate, light to move and mated
        let mut search =
            search_for("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let mut options = SearchOptions::default();
        options.set_depth(2).set_time(None);
        search.think(&options);
        assert_eq!(search.best_move(), None);
    }
}
