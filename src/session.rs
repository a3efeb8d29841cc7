//! Session: phase state machine, score, round timer and presentation cues.
//!
//! One `Session` owns the board and the ledger. The presentation layer feeds it
//! `advance`, `select`, `click` and one `tick` per frame, reads its state back
//! through accessors, and drains `Cue`s to drive sound and effects.

use crate::board::{Board, BoardError, Pos};
use crate::difficulty::{Difficulty, Preset};
use crate::scoring::{HighScoreLedger, points_for};
use crate::timer::RoundTimer;
use log::{debug, info, trace, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Default session ticks per second.
pub const DEFAULT_TICK_RATE: u32 = 30;

/// Timed rounds switch to the critical track at or below this many seconds left.
pub const CRITICAL_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Intro,
    DifficultySelect,
    Playing,
    TimeExpired,
    NoMovesAvailable,
    BoardCleared,
    GaveUp,
    ScoreDisplay,
    Leaderboard,
}

impl Phase {
    /// Round has ended; the board is frozen until the next advance.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::TimeExpired | Self::NoMovesAvailable | Self::BoardCleared | Self::GaveUp
        )
    }

    /// Background track for the phase; `None` keeps whatever is playing.
    pub fn track(self) -> Option<Track> {
        match self {
            Self::Intro | Self::Leaderboard => Some(Track::Opening),
            Self::DifficultySelect => Some(Track::Selection),
            Self::Playing => Some(Track::Gameplay),
            Self::TimeExpired | Self::GaveUp => Some(Track::GameOver),
            Self::NoMovesAvailable => Some(Track::NoMoves),
            Self::BoardCleared => Some(Track::Victory),
            Self::ScoreDisplay => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Opening,
    Selection,
    Gameplay,
    Critical,
    GameOver,
    NoMoves,
    Victory,
}

/// Named trigger for the presentation layer. Ignoring every cue is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    PhaseEntered(Phase),
    /// Emitted only when the track changes.
    Music(Track),
    TilesCleared { color: u8, cells: usize, points: u32 },
}

/// Result of a successful board click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearOutcome {
    pub color: u8,
    /// Positions before gravity.
    pub cells: Vec<Pos>,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub ticks_per_second: u32,
    /// Board generation seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICK_RATE,
            seed: None,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    rng: StdRng,
    phase: Phase,
    preset: Preset,
    board: Board,
    score: u32,
    timer: Option<RoundTimer>,
    ledger: HighScoreLedger,
    music: Option<Track>,
    cues: Vec<Cue>,
}

impl Session {
    /// New session in `Intro`, with a placeholder board for `difficulty`.
    pub fn new(config: SessionConfig, difficulty: Difficulty) -> Result<Self, BoardError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let preset = difficulty.preset();
        let board = preset.build_board(&mut rng)?;
        let mut session = Self {
            config,
            rng,
            phase: Phase::Intro,
            preset,
            board,
            score: 0,
            timer: None,
            ledger: HighScoreLedger::new(),
            music: None,
            cues: Vec::new(),
        };
        session.enter(Phase::Intro);
        Ok(session)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn difficulty_name(&self) -> &'static str {
        self.preset.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ledger(&self) -> &HighScoreLedger {
        &self.ledger
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.ledger.last_rank()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.music
    }

    /// Seconds left in a timed round; `None` when the round is untimed.
    pub fn remaining_secs(&self) -> Option<u32> {
        self.timer.as_ref().map(RoundTimer::remaining_secs)
    }

    /// Take all cues emitted since the last call.
    pub fn take_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    fn enter(&mut self, phase: Phase) {
        info!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.cues.push(Cue::PhaseEntered(phase));
        if let Some(track) = phase.track() {
            self.play(track);
        }
    }

    fn play(&mut self, track: Track) {
        if self.music != Some(track) {
            self.music = Some(track);
            self.cues.push(Cue::Music(track));
        }
    }

    /// Generic "proceed" signal for every phase that is not waiting on a board click or a pick.
    pub fn advance(&mut self) {
        match self.phase {
            Phase::Intro => self.enter(Phase::DifficultySelect),
            Phase::DifficultySelect | Phase::Playing => {
                trace!("advance ignored in {:?}", self.phase);
            }
            Phase::TimeExpired | Phase::NoMovesAvailable | Phase::BoardCleared | Phase::GaveUp => {
                let rank = self.ledger.record(self.score);
                info!("final score {} (rank {:?})", self.score, rank);
                self.enter(Phase::ScoreDisplay);
            }
            Phase::ScoreDisplay => self.enter(Phase::Leaderboard),
            Phase::Leaderboard => self.enter(Phase::Intro),
        }
    }

    /// Pick a difficulty and start a round with a fresh random board.
    pub fn select(&mut self, difficulty: Difficulty) {
        if self.phase != Phase::DifficultySelect {
            trace!("select ignored in {:?}", self.phase);
            return;
        }
        let preset = difficulty.preset();
        match preset.build_board(&mut self.rng) {
            Ok(board) => self.start_round(preset, board),
            Err(e) => warn!("cannot start {}: {}", preset.name, e),
        }
    }

    /// Start a round on an explicit layout from any phase.
    pub fn start_with_board(&mut self, preset: Preset, board: Board) -> Result<(), BoardError> {
        preset.validate()?;
        if !preset.fits(&board) {
            return Err(BoardError::PresetMismatch { preset: preset.name });
        }
        self.start_round(preset, board);
        Ok(())
    }

    fn start_round(&mut self, preset: Preset, board: Board) {
        info!(
            "start {}: {}x{}, {} colours, limit {:?}",
            preset.name, preset.rows, preset.cols, preset.num_colors, preset.time_limit
        );
        self.timer = preset
            .time_limit
            .map(|secs| RoundTimer::new(secs, self.config.ticks_per_second));
        self.preset = preset;
        self.board = board;
        self.score = 0;
        self.enter(Phase::Playing);
    }

    /// Board click at grid `(x, y)`. Clears the region under it if it has two or more tiles.
    pub fn click(&mut self, x: usize, y: usize) -> Option<ClearOutcome> {
        if self.phase != Phase::Playing {
            trace!("click ignored in {:?}", self.phase);
            return None;
        }
        let region = self.board.region_at(x, y);
        if !region.is_clearable() {
            trace!("click at ({x}, {y}) hits {} tile(s), ignored", region.len());
            return None;
        }
        let color = region.color()?;
        let cleared = self.board.clear(&region);
        let points = points_for(cleared, self.preset.score_multiplier);
        self.score = self.score.saturating_add(points);
        debug!(
            "cleared {cleared} of colour {color} at ({x}, {y}): +{points} = {}",
            self.score
        );
        self.cues.push(Cue::TilesCleared {
            color,
            cells: cleared,
            points,
        });
        Some(ClearOutcome {
            color,
            cells: region.into_cells(),
            points,
        })
    }

    /// One frame of game time. Returns the phase entered, if any.
    ///
    /// Checked in order: time up, board cleared, no moves left.
    pub fn tick(&mut self) -> Option<Phase> {
        if self.phase != Phase::Playing {
            return None;
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.tick();
        }
        let next = if self.timer.as_ref().is_some_and(RoundTimer::is_up) {
            Some(Phase::TimeExpired)
        } else if self.board.is_empty() {
            Some(Phase::BoardCleared)
        } else if !self.board.has_valid_move() {
            Some(Phase::NoMovesAvailable)
        } else {
            None
        };
        match next {
            Some(phase) => self.enter(phase),
            None => {
                if self.remaining_secs().is_some_and(|s| s <= CRITICAL_SECS) {
                    self.play(Track::Critical);
                }
            }
        }
        next
    }

    /// Replay the current round from its initial layout.
    pub fn retry(&mut self) {
        if self.phase != Phase::Playing {
            trace!("retry ignored in {:?}", self.phase);
            return;
        }
        info!("retry {}", self.preset.name);
        self.board.reset_to_initial_layout();
        self.score = 0;
        if let Some(timer) = self.timer.as_mut() {
            timer.reset();
        }
        self.play(Track::Gameplay);
    }

    /// End the current round without finishing it.
    pub fn give_up(&mut self) {
        if self.phase == Phase::Playing {
            self.enter(Phase::GaveUp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board;

    fn session() -> Session {
        Session::new(
            SessionConfig {
                ticks_per_second: 2,
                seed: Some(11),
            },
            Difficulty::Easy,
        )
        .unwrap()
    }

    fn preset_for(b: &Board, time_limit: Option<u32>) -> Preset {
        Preset {
            name: "Test",
            description: "",
            rows: b.rows(),
            cols: b.cols(),
            num_colors: b.num_colors(),
            time_limit,
            score_multiplier: 1.0,
        }
    }

    fn play(s: &mut Session, rows: &[&str], num_colors: u8, time_limit: Option<u32>) {
        let b = board(num_colors, rows);
        s.start_with_board(preset_for(&b, time_limit), b).unwrap();
    }

    #[test]
    fn full_cycle_back_to_intro() {
        let mut s = session();
        assert_eq!(s.phase(), Phase::Intro);
        s.advance();
        assert_eq!(s.phase(), Phase::DifficultySelect);
        s.advance();
        assert_eq!(s.phase(), Phase::DifficultySelect);
        s.select(Difficulty::Normal);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.difficulty_name(), "Normal");
        assert_eq!((s.board().rows(), s.board().cols()), (7, 12));
        assert_eq!(s.remaining_secs(), None);
        s.give_up();
        assert_eq!(s.phase(), Phase::GaveUp);
        s.advance();
        assert_eq!(s.phase(), Phase::ScoreDisplay);
        s.advance();
        assert_eq!(s.phase(), Phase::Leaderboard);
        s.advance();
        assert_eq!(s.phase(), Phase::Intro);
    }

    #[test]
    fn select_only_from_difficulty_select() {
        let mut s = session();
        s.select(Difficulty::Hard);
        assert_eq!(s.phase(), Phase::Intro);
        assert_eq!(s.difficulty_name(), "Easy");
    }

    #[test]
    fn timed_preset_starts_countdown() {
        let mut s = session();
        s.advance();
        s.select(Difficulty::Hard);
        assert_eq!(s.remaining_secs(), Some(60));
    }

    #[test]
    fn single_colour_board_clears_then_ends() {
        let mut s = session();
        play(&mut s, &["00", "00"], 1, None);
        let out = s.click(0, 1).unwrap();
        assert_eq!(out.cells.len(), 4);
        assert_eq!(out.points, 64);
        assert_eq!(s.score(), 64);
        assert!(s.board().is_empty());
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.tick(), Some(Phase::BoardCleared));
        assert_eq!(s.phase(), Phase::BoardCleared);
    }

    #[test]
    fn lone_and_outside_clicks_ignored() {
        let mut s = session();
        play(&mut s, &["01", "00"], 2, None);
        assert!(s.click(1, 0).is_none());
        assert!(s.click(9, 9).is_none());
        assert_eq!(s.score(), 0);
        assert_eq!(s.board().remaining(), 4);
    }

    #[test]
    fn no_moves_detected_on_tick() {
        let mut s = session();
        play(&mut s, &["010", "101"], 2, None);
        assert_eq!(s.tick(), Some(Phase::NoMovesAvailable));
    }

    #[test]
    fn time_up_beats_other_outcomes() {
        let mut s = session();
        play(&mut s, &["001", "120"], 3, Some(1));
        assert_eq!(s.tick(), None);
        assert!(s.board().has_valid_move());
        assert_eq!(s.tick(), Some(Phase::TimeExpired));
    }

    #[test]
    fn time_up_wins_over_cleared_board() {
        let mut s = session();
        play(&mut s, &["00"], 1, Some(1));
        s.tick();
        s.click(0, 0);
        assert_eq!(s.tick(), Some(Phase::TimeExpired));
    }

    #[test]
    fn clicks_ignored_after_round_ends() {
        let mut s = session();
        play(&mut s, &["00", "11", "01"], 2, None);
        s.give_up();
        assert!(s.click(0, 0).is_none());
        assert_eq!(s.tick(), None);
    }

    #[test]
    fn score_recorded_on_score_display() {
        let mut s = session();
        play(&mut s, &["0000000000", "0000000000"], 1, None);
        s.click(0, 0);
        assert_eq!(s.score(), 8000);
        s.tick();
        s.advance();
        assert_eq!(s.phase(), Phase::ScoreDisplay);
        assert_eq!(s.last_rank(), Some(0));
        assert_eq!(s.ledger().scores()[0], 8000);
    }

    #[test]
    fn retry_restores_layout_and_score() {
        let mut s = session();
        play(&mut s, &["001", "112"], 3, Some(5));
        let initial = s.board().clone();
        s.tick();
        s.click(0, 0);
        assert!(s.score() > 0);
        s.retry();
        assert_eq!(s.board(), &initial);
        assert_eq!(s.score(), 0);
        assert_eq!(s.remaining_secs(), Some(5));
    }

    #[test]
    fn mismatched_layout_rejected() {
        let mut s = session();
        let b = board(2, &["01"]);
        let err = s.start_with_board(Difficulty::Easy.preset(), b).unwrap_err();
        assert_eq!(err, BoardError::PresetMismatch { preset: "Easy" });
        assert_eq!(s.phase(), Phase::Intro);
    }

    #[test]
    fn zero_multiplier_preset_rejected() {
        let mut s = session();
        let b = board(2, &["00", "11"]);
        let preset = Preset {
            score_multiplier: 0.0,
            ..preset_for(&b, None)
        };
        let err = s.start_with_board(preset, b).unwrap_err();
        assert_eq!(err, BoardError::InvalidMultiplier(0.0));
        assert_eq!(s.phase(), Phase::Intro);
    }

    #[test]
    fn only_round_endings_are_terminal() {
        let terminal = [
            Phase::TimeExpired,
            Phase::NoMovesAvailable,
            Phase::BoardCleared,
            Phase::GaveUp,
        ];
        for p in terminal {
            assert!(p.is_terminal(), "{p:?}");
        }
        for p in [
            Phase::Intro,
            Phase::DifficultySelect,
            Phase::Playing,
            Phase::ScoreDisplay,
            Phase::Leaderboard,
        ] {
            assert!(!p.is_terminal(), "{p:?}");
        }
        let mut s = session();
        play(&mut s, &["01", "10"], 2, None);
        let entered = s.tick().unwrap();
        assert!(entered.is_terminal());
    }

    #[test]
    fn cues_follow_transitions() {
        let mut s = session();
        assert_eq!(
            s.take_cues(),
            vec![Cue::PhaseEntered(Phase::Intro), Cue::Music(Track::Opening)]
        );
        play(&mut s, &["00", "01"], 2, None);
        s.click(0, 0);
        assert_eq!(
            s.take_cues(),
            vec![
                Cue::PhaseEntered(Phase::Playing),
                Cue::Music(Track::Gameplay),
                Cue::TilesCleared {
                    color: 0,
                    cells: 3,
                    points: 27
                },
            ]
        );
        s.tick();
        s.advance();
        s.advance();
        // Leaderboard shares the opening track with Intro.
        s.advance();
        let cues = s.take_cues();
        assert_eq!(
            cues.iter().filter(|c| matches!(c, Cue::Music(Track::Opening))).count(),
            1
        );
        assert_eq!(cues.last(), Some(&Cue::PhaseEntered(Phase::Intro)));
    }

    #[test]
    fn critical_track_near_time_limit() {
        let mut s = session();
        play(&mut s, &["00", "11"], 2, Some(12));
        s.take_cues();
        // 12 s at 2 ticks/s; remaining drops to 10 after 4 ticks.
        for _ in 0..3 {
            s.tick();
        }
        assert_eq!(s.current_track(), Some(Track::Gameplay));
        s.tick();
        assert_eq!(s.current_track(), Some(Track::Critical));
        assert_eq!(s.take_cues(), vec![Cue::Music(Track::Critical)]);
    }

    #[test]
    fn seeded_sessions_deal_same_board() {
        let mut a = session();
        let mut b = session();
        for s in [&mut a, &mut b] {
            s.advance();
            s.select(Difficulty::Expert);
        }
        assert_eq!(a.board(), b.board());
    }
}
