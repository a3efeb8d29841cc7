//! Difficulty presets: grid size, colour count, time limit and score multiplier.

use crate::board::{Board, BoardError, MAX_COLORS};
use clap::ValueEnum;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
    #[value(alias = "veryhard")]
    VeryHard,
    Expert,
}

/// Immutable bundle of board configuration for one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub num_colors: u8,
    /// Seconds; `None` = untimed.
    pub time_limit: Option<u32>,
    pub score_multiplier: f64,
}

impl Difficulty {
    pub const ALL: [Self; 5] = [
        Self::Easy,
        Self::Normal,
        Self::Hard,
        Self::VeryHard,
        Self::Expert,
    ];

    pub const fn preset(self) -> Preset {
        match self {
            Self::Easy => Preset {
                name: "Easy",
                description: "Small grid, few colors",
                rows: 5,
                cols: 5,
                num_colors: 3,
                time_limit: None,
                score_multiplier: 1.0,
            },
            Self::Normal => Preset {
                name: "Normal",
                description: "Larger grid, more colors",
                rows: 7,
                cols: 12,
                num_colors: 4,
                time_limit: None,
                score_multiplier: 1.2,
            },
            Self::Hard => Preset {
                name: "Hard",
                description: "Timed play",
                rows: 9,
                cols: 15,
                num_colors: 5,
                time_limit: Some(60),
                score_multiplier: 1.5,
            },
            Self::VeryHard => Preset {
                name: "Very Hard",
                description: "Shorter time",
                rows: 8,
                cols: 15,
                num_colors: 6,
                time_limit: Some(45),
                score_multiplier: 2.0,
            },
            Self::Expert => Preset {
                name: "Expert",
                description: "Maximum challenge",
                rows: 10,
                cols: 20,
                num_colors: 8,
                time_limit: Some(30),
                score_multiplier: 3.0,
            },
        }
    }

    /// Menu position (0-based) → difficulty.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|d| *d == self).unwrap_or(0)
    }
}

impl Preset {
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(BoardError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.num_colors == 0 || self.num_colors > MAX_COLORS {
            return Err(BoardError::InvalidColorCount(self.num_colors));
        }
        if !self.score_multiplier.is_finite() || self.score_multiplier <= 0.0 {
            return Err(BoardError::InvalidMultiplier(self.score_multiplier));
        }
        Ok(())
    }

    pub fn is_timed(&self) -> bool {
        self.time_limit.is_some()
    }

    /// New random board for this preset.
    pub fn build_board<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Board, BoardError> {
        Board::random(self.rows, self.cols, self.num_colors, rng)
    }

    /// True if `board` has this preset's shape and colour count.
    pub fn fits(&self, board: &Board) -> bool {
        board.rows() == self.rows && board.cols() == self.cols && board.num_colors() == self.num_colors
    }
}
