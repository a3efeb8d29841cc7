//! SameGame TUI: clear groups of same-coloured tiles in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use samegametui::session::DEFAULT_TICK_RATE;
use samegametui::{Difficulty, SessionConfig};

/// Options derived from CLI that affect the session and the front end.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub session: SessionConfig,
    pub difficulty: Difficulty,
    pub skip_menu: bool,
    pub animation: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        session: SessionConfig {
            ticks_per_second: args.tick_rate.max(1),
            seed: args.seed,
        },
        difficulty: args.difficulty,
        skip_menu: args.no_menu,
        animation: !args.no_animation,
    };
    let mut app = App::new(config, theme)?;
    app.run()?;
    Ok(())
}

/// The TUI owns the screen, so logs only go to a file when one is given.
fn init_logging(path: Option<&std::path::Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

/// SameGame puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "samegametui",
    version,
    about = "SameGame in the terminal. Click groups of two or more same-coloured tiles to clear them.",
    long_about = "Samegametui is a terminal version of the classic SameGame puzzle.\n\n\
        Click a group of two or more touching tiles of the same colour to clear it. Tiles above \
        fall down and empty columns close up to the left. Bigger groups score far more \
        (size cubed, times the difficulty multiplier). The round ends when the board is clear, \
        no group is left, or the timer runs out.\n\n\
        CONTROLS:\n  Mouse click   Clear group / continue\n  Arrows, hjkl  Move cursor\n  \
        Enter/Space   Clear group at cursor / continue\n  1-5           Pick difficulty\n  \
        R             Retry same board    G  Give up\n  Q / Esc       Quit"
)]
pub struct Args {
    /// Difficulty preselected in the menu (or played directly with --no-menu).
    #[arg(short, long, default_value = "easy")]
    pub difficulty: Difficulty,

    /// Skip the title and difficulty screens and start playing immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Seed for board generation; the same seed deals the same boards.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Game logic ticks per second (drives the round timer).
    #[arg(long, default_value_t = DEFAULT_TICK_RATE, value_name = "RATE")]
    pub tick_rate: u32,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the tile-clear fade.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (level from RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,
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
