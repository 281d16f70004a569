use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use pawngrid::search::minimax::MiniMax;
use pawngrid::search::random::RandomStrategy;
use pawngrid::{
    Alliance, Board, Move, MoveRecord, MoveStrategy, PieceKind, SearchEvent, Square,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Immutable-board chess engine with minimax search", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play an interactive game against the engine
    Play {
        /// Your color: 'w' for white, 'b' for black
        #[arg(long, default_value = "w")]
        color: String,

        /// Engine search depth in plies
        #[arg(long, default_value_t = 3)]
        depth: u32,

        /// Starting FEN position
        #[arg(long)]
        fen: Option<String>,

        /// Worker threads for scoring root moves
        #[arg(long, default_value_t = 1)]
        threads: usize,

        /// Print per-candidate search progress
        #[arg(long)]
        verbose: bool,
    },
    /// Run a batch of engine self-play games
    Selfplay {
        #[arg(long, default_value_t = 10)]
        games: usize,

        #[arg(long, default_value_t = 2)]
        depth: u32,

        /// Abandon a game after this many plies
        #[arg(long, default_value_t = 200)]
        max_plies: usize,

        /// Play the opening plies of each game randomly so games differ
        #[arg(long, default_value_t = 4)]
        random_plies: usize,

        /// Use the random strategy for both sides throughout
        #[arg(long)]
        random: bool,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Write finished games as JSON
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, default_value_t = 1)]
        threads: usize,
    },
    /// Count move-generation nodes
    Perft {
        #[arg(long, default_value_t = 4)]
        depth: u32,

        #[arg(long)]
        fen: Option<String>,

        /// Print per-root-move counts at the full depth
        #[arg(long)]
        divide: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    match args.command {
        Command::Play {
            color,
            depth,
            fen,
            threads,
            verbose,
        } => cmd_play(&color, depth, fen.as_deref(), threads, verbose),
        Command::Selfplay {
            games,
            depth,
            max_plies,
            random_plies,
            random,
            seed,
            out,
            threads,
        } => cmd_selfplay(games, depth, max_plies, random_plies, random, seed, out, threads),
        Command::Perft { depth, fen, divide } => cmd_perft(depth, fen.as_deref(), divide),
    }
}

fn parse_color(color_str: &str) -> Result<Alliance> {
    match color_str.to_lowercase().as_str() {
        "w" | "white" => Ok(Alliance::White),
        "b" | "black" => Ok(Alliance::Black),
        _ => bail!("invalid color {color_str:?}: use 'w' or 'b'"),
    }
}

fn starting_board(fen: Option<&str>) -> Result<Board> {
    match fen {
        Some(s) => Board::from_fen(s).with_context(|| format!("invalid FEN {s:?}")),
        None => Ok(Board::standard()),
    }
}

/// Terminal classification of the position, if any.
fn game_over(board: &Board) -> Option<Outcome> {
    let player = board.current_player();
    if player.is_in_checkmate() {
        Some(if player.alliance().is_white() {
            Outcome::BlackWins
        } else {
            Outcome::WhiteWins
        })
    } else if player.is_in_stalemate() {
        Some(Outcome::Stalemate)
    } else {
        None
    }
}

// -------------------------------------------------------------------------
// play
// -------------------------------------------------------------------------

fn cmd_play(color: &str, depth: u32, fen: Option<&str>, threads: usize, verbose: bool) -> Result<()> {
    let human = parse_color(color)?;
    let mut board = starting_board(fen)?;
    let mut engine = MiniMax::new(depth);
    engine.set_threads(threads);

    loop {
        println!("\n{board}\n");
        if let Some(outcome) = game_over(&board) {
            match outcome {
                Outcome::WhiteWins => println!("Checkmate! White wins."),
                Outcome::BlackWins => println!("Checkmate! Black wins."),
                Outcome::Stalemate => println!("Stalemate."),
                Outcome::Unfinished => unreachable!(),
            }
            break;
        }
        let player = board.current_player();
        if player.is_in_check() {
            println!("{} is in check", player.alliance());
        }
        println!("{} to move", player.alliance());

        let mv = if player.alliance() == human {
            match get_human_move(&board)? {
                Some(mv) => mv,
                None => {
                    println!("bye");
                    break;
                }
            }
        } else {
            println!("Thinking with depth = {depth}...");
            let mut observer = |event: &SearchEvent| match event {
                SearchEvent::RootMove {
                    index,
                    total,
                    mv,
                    best,
                    score,
                } => {
                    if verbose {
                        match score {
                            Some(s) => println!("  ({index}/{total}) {mv} -> {s}, best {best}"),
                            None => println!("  ({index}/{total}) {mv} rejected"),
                        }
                    }
                }
                SearchEvent::Finished {
                    best,
                    boards_evaluated,
                    elapsed,
                    ..
                } => {
                    let rate = *boards_evaluated as f64 / elapsed.as_secs_f64().max(1e-9);
                    println!(
                        "Engine plays {best} ({boards_evaluated} boards in {:.2}s, {rate:.0} boards/s)",
                        elapsed.as_secs_f64()
                    );
                }
            };
            engine.execute_with_observer(&board, &mut observer)
        };

        let transition = board.current_player().make_move(&mv);
        if !transition.status().is_done() {
            // Human moves are drawn from the legal set, engine moves from
            // the search; neither can be rejected here.
            bail!("move {mv} rejected with {:?}", transition.status());
        }
        board = transition.into_board();
    }
    Ok(())
}

/// Prompt until the user enters a legal move (`e2e4`, `e7e8q`) or `quit`.
fn get_human_move(board: &Board) -> Result<Option<Move>> {
    loop {
        print!("Your move (e.g. e2e4, e7e8q, 'quit'): ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim();
        if input.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        match find_move(board, input) {
            Some(mv) => return Ok(Some(mv)),
            None => println!("Illegal or unparseable move: {input:?}"),
        }
    }
}

/// Match coordinate input against the current player's legal set. A bare
/// from-to pair resolves a promotion to the queen; a trailing letter picks
/// the promotion kind.
fn find_move(board: &Board, input: &str) -> Option<Move> {
    if input.len() < 4 || input.len() > 5 || !input.is_ascii() {
        return None;
    }
    let from = Square::from_algebraic(&input[0..2])?;
    let to = Square::from_algebraic(&input[2..4])?;
    let promotion = match input.as_bytes().get(4) {
        None => None,
        Some(b'q') | Some(b'Q') => Some(PieceKind::Queen),
        Some(b'r') | Some(b'R') => Some(PieceKind::Rook),
        Some(b'b') | Some(b'B') => Some(PieceKind::Bishop),
        Some(b'n') | Some(b'N') => Some(PieceKind::Knight),
        Some(_) => return None,
    };
    board
        .current_player()
        .legal_moves()
        .iter()
        .find(|mv| {
            mv.from() == from
                && mv.to() == to
                && match (mv, promotion) {
                    (Move::PawnPromotion { promote_to, .. }, Some(kind)) => *promote_to == kind,
                    (Move::PawnPromotion { promote_to, .. }, None) => {
                        *promote_to == PieceKind::Queen
                    }
                    (_, None) => true,
                    (_, Some(_)) => false,
                }
        })
        .cloned()
}

// -------------------------------------------------------------------------
// selfplay
// -------------------------------------------------------------------------

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    WhiteWins,
    BlackWins,
    Stalemate,
    Unfinished,
}

#[derive(Serialize, Debug)]
struct GameRecord {
    moves: Vec<MoveRecord>,
    outcome: Outcome,
}

#[allow(clippy::too_many_arguments)]
fn cmd_selfplay(
    games: usize,
    depth: u32,
    max_plies: usize,
    random_plies: usize,
    random: bool,
    seed: u64,
    out: Option<PathBuf>,
    threads: usize,
) -> Result<()> {
    let start = Instant::now();
    let bar = ProgressBar::new(games as u64);
    let mut records = Vec::with_capacity(games);

    for game_index in 0..games {
        let mut board = Board::standard();
        let mut engine = MiniMax::new(depth);
        engine.set_threads(threads);
        let mut opening = RandomStrategy::seeded(seed.wrapping_add(game_index as u64));
        let mut moves: Vec<MoveRecord> = Vec::new();

        let outcome = loop {
            if let Some(outcome) = game_over(&board) {
                break outcome;
            }
            if moves.len() >= max_plies {
                break Outcome::Unfinished;
            }
            let mv = if random || moves.len() < random_plies {
                opening.execute(&board)
            } else {
                engine.execute(&board)
            };
            let transition = board.current_player().make_move(&mv);
            if !transition.status().is_done() {
                bail!("self-play produced a rejected move: {mv}");
            }
            moves.push(mv.record());
            board = transition.into_board();
        };
        log::debug!(
            "game {} finished: {:?} after {} plies",
            game_index + 1,
            outcome,
            moves.len()
        );
        records.push(GameRecord { moves, outcome });
        bar.inc(1);
    }
    bar.finish_and_clear();

    let count = |o: Outcome| records.iter().filter(|r| r.outcome == o).count();
    println!(
        "{} games in {:.1}s: +{} -{} ={} ({} unfinished)",
        games,
        start.elapsed().as_secs_f64(),
        count(Outcome::WhiteWins),
        count(Outcome::BlackWins),
        count(Outcome::Stalemate),
        count(Outcome::Unfinished),
    );

    if let Some(path) = out {
        let file = File::create(&path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &records)?;
        println!("wrote {} game records to {}", records.len(), path.display());
    }
    Ok(())
}

// -------------------------------------------------------------------------
// perft
// -------------------------------------------------------------------------

fn cmd_perft(depth: u32, fen: Option<&str>, divide: bool) -> Result<()> {
    let board = starting_board(fen)?;
    if divide {
        let start = Instant::now();
        let split = pawngrid::perft::divide(&board, depth);
        let total: u64 = split.iter().map(|(_, n)| n).sum();
        for (mv, nodes) in &split {
            println!("{mv}: {nodes}");
        }
        println!(
            "\nperft({depth}) = {total} in {:.2}s",
            start.elapsed().as_secs_f64()
        );
    } else {
        for d in 1..=depth {
            let start = Instant::now();
            let nodes = pawngrid::perft::perft(&board, d);
            let secs = start.elapsed().as_secs_f64();
            println!(
                "perft({d}) = {nodes} in {secs:.2}s ({:.0} nodes/s)",
                nodes as f64 / secs.max(1e-9)
            );
        }
    }
    Ok(())
}
