//! Columnstui: Columns-style falling-jewel matching puzzle in the terminal.

mod app;
mod input;
mod text;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};

/// Options derived from CLI that affect how the game is driven (cadence, seed, what is shown).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub fall_interval_ms: u64,
    pub settle_interval_ms: u64,
    pub frame_rate: f64,
    pub show_hidden: bool,
    pub verbose: bool,
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            seed: args.seed,
            fall_interval_ms: args.fall_ms.max(1),
            settle_interval_ms: args.settle_ms,
            frame_rate: args.frame_rate.clamp(1.0, 240.0),
            show_hidden: args.show_hidden,
            verbose: args.verbose,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = GameConfig::from_args(&args);
    let snapshot = if args.text {
        text::run(&config)?
    } else {
        let theme = theme::Theme::load(args.theme.as_deref(), args.palette)
            .with_context(|| format!("loading theme {:?}", args.theme))?;
        let mut app = App::new(config, theme);
        app.run()?
    };
    if args.dump_final {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

/// Columns-style falling-jewel puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "columnstui",
    version,
    about = "Columns-style falling-jewel puzzle in the terminal. Line up three of a kind in any direction.",
    long_about = "Columnstui is a terminal take on Columns.\n\n\
        Columns of three jewels drop into a 6x13 well. Line up three or more of the same jewel \
        horizontally, vertically or diagonally to clear them (10 points each). The golden jewel \
        matches anything and is worth 100. The game ends when a column freezes before it has \
        fully entered the well.\n\n\
        CONTROLS:\n  Left/Right h/l  Move    Up/Space k  Rotate    Down/Enter j  Drop one row\n  \
        P  Pause    R  Restart (after game over)    Q / Esc  Quit\n\n\
        TEXT MODE (--text): Enter drops, R rotates, < and > move, Q quits."
)]
pub struct Args {
    /// Seed for the jewel stream; same seed, same game.
    #[arg(short, long, value_name = "N")]
    pub seed: Option<u64>,

    /// Automatic fall interval in ms.
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub fall_ms: u64,

    /// Interval between matching/clearing steps in ms, so matched jewels are visible.
    #[arg(long, default_value = "150", value_name = "MS")]
    pub settle_ms: u64,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Line-based front-end on stdin/stdout instead of the full-screen UI.
    #[arg(long)]
    pub text: bool,

    /// Also draw the three hidden spawn rows.
    #[arg(long)]
    pub show_hidden: bool,

    /// Report every game event (stderr in text mode, sidebar in the UI).
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the final board as JSON on exit.
    #[arg(long)]
    pub dump_final: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
