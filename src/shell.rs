use crate::board::Board;
use crate::permute::RandomizerChoice;
use crate::piece::Color;
use crate::r#move::Move;
use crate::search::{Search, SearchAlgorithm, SearchOptions};

use regex::Regex;
use rustyline::config::Configurer;
use rustyline::Editor;
use std::time::Duration;

/// What the engine does when asked to move
#[derive(Debug, Copy, Clone, PartialEq)]
enum EngineChoice {
    Random,
    Minimax,
    AlphaBeta,
}

/// Interactive console driver. The human plays light, the engine plays
/// dark and answers automatically after each human move. All rules live in
/// the board and search; the shell only relays moves and results.
pub struct Shell {
    search: Search,
    options: SearchOptions,
    algorithm: EngineChoice,
    randomizer: RandomizerChoice,
    editor: Editor<()>,
}
impl Default for Shell {
    fn default() -> Self {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);
        let mut options = SearchOptions::default();
        options
            .set_depth(9)
            .set_time(Some(Duration::from_millis(10_000)))
            .set_verbose(true);
        Shell {
            search: Search::new(Board::new()),
            options,
            algorithm: EngineChoice::AlphaBeta,
            randomizer: RandomizerChoice::KeySort,
            editor,
        }
    }
}

impl Shell {
    pub fn run(&mut self) {
        println!("{}", self.search.board());
        while let Ok(line) = self.editor.readline("pangolin> ") {
            match self.handle_command(&line) {
                Ok(OkCode::ShouldQuit) => break,
                Err(ErrCode::BadCommand(cmd)) => {
                    eprintln!("Unknown or badly formed command: {}", cmd)
                }
                Err(ErrCode::BadMove(mv)) => {
                    eprintln!("Badly formatted or illegal move: {}", mv)
                }
                Err(ErrCode::MissingArg(arg)) => {
                    eprintln!("Missing an argument: {} {} <- here", line.trim(), arg)
                }
                Err(ErrCode::BadPosition(msg)) => eprintln!("Bad position: {}", msg),
                _ => (),
            }
        }
    }

    fn handle_command(&mut self, line: &str) -> Result<OkCode, ErrCode> {
        let args_regex = Self::args_regex();
        let mut args = args_regex.find_iter(line).map(|m| m.as_str());
        let cmd = if let Some(c) = args.next() {
            c
        } else {
            return Err(ErrCode::NoCommand);
        };
        match cmd {
            "new" => {
                self.search = Search::new(Board::new());
                println!("{}", self.search.board());
            }
            "position" => {
                match args.next() {
                    Some("startpos") => self.search = Search::new(Board::new()),
                    Some(first) => {
                        let mut fen = first.replace('"', "");
                        for part in args {
                            fen.push(' ');
                            fen.push_str(part);
                        }
                        match Board::from_fen(&fen) {
                            Ok(board) => self.search = Search::new(board),
                            Err(msg) => return Err(ErrCode::BadPosition(msg)),
                        }
                    }
                    None => return Err(ErrCode::MissingArg(String::from("<startpos | fen>"))),
                }
                println!("{}", self.search.board());
            }
            "show" => println!("{}", self.search.board()),
            "moves" => {
                let mut line = String::new();
                for m in self.legal_moves() {
                    line.push_str(&format!("{} ", m));
                }
                println!("{}", line.trim());
            }
            "algorithm" => {
                self.algorithm = match args.next() {
                    Some("random") => EngineChoice::Random,
                    Some("minimax") => EngineChoice::Minimax,
                    Some("alphabeta") => EngineChoice::AlphaBeta,
                    Some(other) => return Err(ErrCode::BadCommand(String::from(other))),
                    None => {
                        return Err(ErrCode::MissingArg(String::from(
                            "<random | minimax | alphabeta>",
                        )))
                    }
                }
            }
            "randomizer" => {
                self.randomizer = match args.next() {
                    Some("keysort") => RandomizerChoice::KeySort,
                    Some("inplace") => RandomizerChoice::InPlace,
                    Some(other) => return Err(ErrCode::BadCommand(String::from(other))),
                    None => return Err(ErrCode::MissingArg(String::from("<keysort | inplace>"))),
                }
            }
            "time" => {
                let millis = args
                    .next()
                    .and_then(|a| a.parse::<u64>().ok())
                    .ok_or_else(|| ErrCode::MissingArg(String::from("<milliseconds>")))?;
                self.options.set_time(Some(Duration::from_millis(millis)));
            }
            "depth" => {
                let depth = args
                    .next()
                    .and_then(|a| a.parse::<usize>().ok())
                    .ok_or_else(|| ErrCode::MissingArg(String::from("<depth>")))?;
                self.options.set_depth(depth);
            }
            "go" => self.engine_move(),
            "random" => {
                let randomizer = self.randomizer;
                match self.search.random_move(randomizer) {
                    Some(m) => self.apply_engine_move(m),
                    None => println!("no legal move available"),
                }
            }
            "perft" => {
                let depth = args
                    .next()
                    .and_then(|a| a.parse::<u32>().ok())
                    .ok_or_else(|| ErrCode::MissingArg(String::from("<depth>")))?;
                crate::perft(depth, Some(self.search.board().to_fen()));
            }
            "quit" => return Ok(OkCode::ShouldQuit),
            // anything else is tried as a move for the side at the board
            _ => {
                if Move::parse(cmd).is_none() {
                    return Err(ErrCode::BadCommand(String::from(cmd)));
                }
                if self.search.board_mut().make_from_str(cmd).is_err() {
                    return Err(ErrCode::BadMove(String::from(cmd)));
                }
                println!("{}", self.search.board());
                if !self.announce_result() && self.search.board().side_to_move() == Color::Dark {
                    self.engine_move();
                }
            }
        }

        Ok(OkCode::OkCommand)
    }

    fn engine_move(&mut self) {
        let chosen = match self.algorithm {
            EngineChoice::Random => {
                let randomizer = self.randomizer;
                self.search.random_move(randomizer)
            }
            EngineChoice::Minimax | EngineChoice::AlphaBeta => {
                let mut options = self.options.clone();
                options.set_algorithm(if self.algorithm == EngineChoice::Minimax {
                    SearchAlgorithm::Minimax
                } else {
                    SearchAlgorithm::AlphaBeta
                });
                self.search.think(&options);
                println!("nodes searched: {}", self.search.nodes());
                self.search.best_move()
            }
        };
        match chosen {
            Some(m) => self.apply_engine_move(m),
            None => println!("engine has no legal move"),
        }
    }

    fn apply_engine_move(&mut self, m: Move) {
        if !self.search.board_mut().make(m) {
            eprintln!("engine chose an illegal move: {}", m);
            return;
        }
        println!("engine plays {}", m);
        println!("{}", self.search.board());
        self.announce_result();
    }

    fn legal_moves(&mut self) -> Vec<Move> {
        let board = self.search.board_mut();
        let mut legal = vec![];
        let moves = board.legal_moves();
        for m in &moves {
            if board.make(*m) {
                board.unmake();
                legal.push(*m);
            }
        }
        legal
    }

    /// Prints the game result if the position is final. Returns whether the
    /// game is over.
    fn announce_result(&mut self) -> bool {
        if self.legal_moves().is_empty() {
            let side = self.search.board().side_to_move();
            if self.search.board().in_check(side) {
                println!(
                    "checkmate, {} wins",
                    if side == Color::Light { "dark" } else { "light" }
                );
            } else {
                println!("stalemate");
            }
            return true;
        }
        if self.search.board().halfmove_clock() >= 100 {
            println!("draw by the fifty move rule");
            return true;
        }
        if self.search.board().repetitions() >= 2 {
            println!("draw by repetition");
            return true;
        }
        false
    }

    fn args_regex() -> Regex {
        Regex::new(r#"(".*?"|[^"\s]+)"#).unwrap()
    }
}

enum OkCode {
    OkCommand,
    ShouldQuit,
}

enum ErrCode {
    MissingArg(String),
    NoCommand,
    BadCommand(String),
    BadMove(String),
    BadPosition(String),
}
