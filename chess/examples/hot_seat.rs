// Two players taking turns at one terminal
//
// Usage: hot_seat [FEN]. Set RUST_LOG=debug to watch combat and relocation.

use hpchess::{relay::RelayEvent, Color, HpChess, Resolution, UciMove};
use std::env;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

fn print_captured(game: &HpChess) {
    for color in [Color::White, Color::Black] {
        let pieces: Vec<_> = game
            .captured(color)
            .iter()
            .map(|p| format!("{}({})", p.piece.name(), p.hp))
            .collect();
        if !pieces.is_empty() {
            println!("{} lost: {}", color.name(), pieces.join(", "));
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut game = match env::args().nth(1) {
        Some(fen) => match HpChess::from_fen(&fen) {
            Ok(game) => game,
            Err(e) => {
                eprintln!("Bad FEN: {}", e);
                return;
            }
        },
        None => HpChess::new(),
    };
    let mut stdin = io::stdin().lock();

    loop {
        if let Some(outcome) = game.outcome() {
            println!("{}", game);
            println!("Game finished: {}", outcome);
            break;
        }

        println!("{}", game);
        print_captured(&game);
        let side = game.turn();
        for color in [Color::White, Color::Black] {
            if game.is_king_in_lethal_danger(color) {
                println!("{} king is in lethal danger!", color.name());
            }
        }
        print!("{} move (e.g. e2e4, or \"reset\"): ", side.name());
        io::stdout().flush().unwrap();
        let mut s = String::new();
        if stdin.read_line(&mut s).unwrap() == 0 {
            break;
        }
        let s = s.trim();

        if s == "reset" {
            game.reset();
            println!("{}", RelayEvent::Reset.encode().unwrap());
            continue;
        }

        let mv = match UciMove::from_str(s) {
            Ok(mv) => mv,
            Err(e) => {
                println!("Bad move: {}\n", e);
                continue;
            }
        };
        if game.position().get(mv.src).color() != Some(side) {
            println!("No {} piece on {}\n", side.name(), mv.src);
            continue;
        }
        if !game.destinations(mv.src).contains(&mv.dst) {
            let options: Vec<_> = game
                .valid_moves(mv.src)
                .into_iter()
                .map(|d| d.notation)
                .collect();
            println!("Not allowed. Options: {}\n", options.join(" "));
            continue;
        }

        match game.make_move(mv.src, mv.dst).unwrap() {
            Resolution::Moved => {}
            Resolution::Killed { victim } => println!("{} destroyed", victim.piece.name()),
            Resolution::Relocated {
                piece, square, hp, ..
            } => println!("{} survives with {} and flees to {}", piece.name(), hp, square),
            Resolution::Eliminated { victim } => {
                println!("{} survives but has nowhere to go", victim.piece.name())
            }
        }
        let event = RelayEvent::Move {
            from: mv.src,
            to: mv.dst,
            color: side,
        };
        println!("{}\n", event.encode().unwrap());
    }
}
