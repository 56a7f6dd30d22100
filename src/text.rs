//! Line-based front-end: one command per line, board printed after every step.

use crate::GameConfig;
use anyhow::Result;
use columnstui::{Command, Game, Phase, Snapshot};
use std::io::{self, BufRead, Write};

/// Parse one input line. Empty line is a fall step.
fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "" => Some(Command::SoftDrop),
        "R" | "r" => Some(Command::Rotate),
        "<" => Some(Command::MoveLeft),
        ">" => Some(Command::MoveRight),
        "Q" | "q" => Some(Command::Quit),
        _ => None,
    }
}

fn print_state(out: &mut impl Write, game: &Game, show_hidden: bool) -> io::Result<()> {
    if show_hidden {
        write!(out, "{:#}", game.board())?;
    } else {
        write!(out, "{}", game.board())?;
    }
    let next: String = game.next_pieces().iter().map(|p| p.jewel().glyph()).collect();
    writeln!(out, "Score: {}  Next: {}", game.score(), next)
}

/// Play on stdin/stdout until the game ends or input runs out.
pub fn run(config: &GameConfig) -> Result<Snapshot> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(config, stdin.lock(), stdout.lock())
}

pub fn run_with(config: &GameConfig, input: impl BufRead, mut out: impl Write) -> Result<Snapshot> {
    let mut game = Game::new(config.seed);
    let mut lines = input.lines();
    while !game.is_over() {
        print_state(&mut out, &game, config.show_hidden)?;
        if game.phase() == Phase::Falling {
            write!(out, "> ")?;
        }
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            // end of input
            game.apply(Command::Quit);
            break;
        };
        let event = match (game.phase(), parse_command(&line)) {
            (_, Some(Command::Quit)) => game.apply(Command::Quit),
            (Phase::Falling, Some(command)) => game.apply(command),
            (Phase::Falling, None) => None,
            // the board settles one step per line while no faller is active
            _ => game.tick(),
        };
        if let Some(event) = event.filter(|_| config.verbose) {
            eprintln!("{event:?}");
        }
    }
    print_state(&mut out, &game, config.show_hidden)?;
    if game.is_game_over() {
        writeln!(out, "GAME OVER")?;
    }
    writeln!(out, "Game Ended, Bye")?;
    Ok(game.snapshot())
}
