//! SameGame engine: board, scoring, difficulty presets and the session state machine.
//!
//! The terminal front end in `main.rs` is one presentation layer over this crate;
//! nothing here draws, plays sound or reads the terminal.

pub mod board;
pub mod difficulty;
pub mod scoring;
pub mod session;
pub mod timer;

pub use board::{Board, BoardError, Cell, Pos, Region};
pub use difficulty::{Difficulty, Preset};
pub use scoring::{HighScoreLedger, points_for};
pub use session::{ClearOutcome, Cue, Phase, Session, SessionConfig, Track};
