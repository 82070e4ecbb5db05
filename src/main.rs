use std::process::ExitCode;

use chic_rules::chess_board::fen::INITIAL_POSITION;
use chic_rules::perft::divide;
use chic_rules::{ChessBoard, ChessResult, Game};

use clap::arg;
use clap::command;
use clap::Command;

use tabled::settings::Style;
use tabled::Table;
use tabled::Tabled;

fn main() -> ExitCode {
    let matches = command!()
        .version("v0.1.0")
        .propagate_version(true)
        .arg_required_else_help(true)
        .arg(arg!(
            -d --debug "Turn debugging information on"
        ))
        .subcommand(
            Command::new("perft")
                .about("Count move paths from a position")
                .arg(
                    arg!(
                    -f --fen <FEN> "Board position"
                            )
                    .default_value(INITIAL_POSITION),
                )
                .arg(
                    arg!(
                    -x --depth <d> "depth"
                            )
                    .default_value("3")
                    .value_parser(clap::value_parser!(u8)),
                )
                .arg(
                    arg!(
                    -m --moves <moves> "Moves played before counting"
                            )
                    .num_args(1..)
                    .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Replay a game from move text and report its result")
                .arg(
                    arg!(
                    -f --fen <FEN> "Starting position"
                            )
                    .default_value(INITIAL_POSITION),
                )
                .arg(
                    arg!(
                    -m --moves <moves> "Moves in any supported notation"
                            )
                    .required(true)
                    .num_args(1..)
                    .value_parser(clap::value_parser!(String)),
                )
                .arg(arg!(
                    -b --board "Print the final board"
                )),
        )
        .get_matches();

    let debug = matches.get_flag("debug");

    let outcome = match matches.subcommand() {
        Some(("perft", arg_matches)) => {
            let fen = arg_matches.get_one::<String>("fen").map_or(INITIAL_POSITION, |s| s.as_str());
            let depth = arg_matches.get_one::<u8>("depth").copied().unwrap_or(3);
            let moves = moves_argument(arg_matches);
            perft(fen, &moves, depth, debug)
        }
        Some(("replay", arg_matches)) => {
            let fen = arg_matches.get_one::<String>("fen").map_or(INITIAL_POSITION, |s| s.as_str());
            let moves = moves_argument(arg_matches);
            replay(fen, &moves, arg_matches.get_flag("board"), debug)
        }
        _ => unreachable!("Exhausted list of subcommands"),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn moves_argument(arg_matches: &clap::ArgMatches) -> Vec<&str> {
    arg_matches
        .get_many::<String>("moves")
        .unwrap_or_default()
        .map(|s| s.as_str())
        .filter(|v| !v.is_empty())
        .collect()
}

#[derive(Tabled)]
struct PerftRow {
    #[tabled(rename = "move")]
    mv: String,
    nodes: u64,
}

fn perft(fen: &str, moves: &[&str], depth: u8, debug: bool) -> ChessResult<()> {
    println!("Perft test for {} moves {:?} with depth {}", fen, moves, depth);
    let mut game = Game::from_position(ChessBoard::from_fen(fen)?);
    for m in moves {
        let notation = game.play_notation(m)?;
        if debug {
            eprintln!("{} -> {}", notation, game.current().map(|b| b.to_fen()).unwrap_or_default());
        }
    }

    let Some(board) = game.current() else {
        return Ok(());
    };
    let rows: Vec<PerftRow> = divide(board, depth)
        .into_iter()
        .map(|(mv, nodes)| PerftRow { mv, nodes })
        .collect();
    let num_nodes: u64 = rows.iter().map(|row| row.nodes).sum();

    println!("{}", Table::new(rows).with(Style::modern()));
    println!("\nNodes searched: {}", num_nodes);
    Ok(())
}

#[derive(Tabled)]
struct ReplayRow {
    ply: usize,
    notation: String,
    fen: String,
}

fn replay(fen: &str, moves: &[&str], show_board: bool, debug: bool) -> ChessResult<()> {
    let mut game = Game::from_position(ChessBoard::from_fen(fen)?);
    let mut rows = Vec::new();
    for (ply, m) in moves.iter().enumerate() {
        if let Some(result) = game.result() {
            eprintln!("Game already over ({}), ignoring {}", result, m);
            break;
        }
        let notation = game.play_notation(m)?;
        let fen = game.current().map(|b| b.to_fen()).unwrap_or_default();
        if debug {
            eprintln!("{:>3}. {:<8} {}", ply + 1, notation, fen);
        }
        rows.push(ReplayRow {
            ply: ply + 1,
            notation,
            fen,
        });
    }

    println!("{}", Table::new(rows).with(Style::modern()));
    if show_board {
        if let Some(board) = game.current() {
            println!("{}", board.render_to_string());
        }
    }
    match game.result() {
        Some(result) => println!("{} ({})", result, result.score_string()),
        None => println!("Game in progress"),
    }
    Ok(())
}
