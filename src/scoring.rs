//! Points per clear and the in-memory top-10 ledger.

/// Seed list for a fresh ledger.
pub const DEFAULT_TOP_SCORES: [u32; 10] = [5120, 2560, 1280, 640, 320, 160, 80, 40, 20, 10];

/// Ledger length.
pub const LEDGER_SIZE: usize = 10;

/// `floor(cells^3 * multiplier)`.
pub fn points_for(cells_cleared: usize, multiplier: f64) -> u32 {
    let n = cells_cleared as f64;
    (n * n * n * multiplier).floor() as u32
}

/// Top scores, descending. Lives for the process lifetime only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreLedger {
    scores: Vec<u32>,
    last_rank: Option<usize>,
}

impl Default for HighScoreLedger {
    fn default() -> Self {
        Self {
            scores: DEFAULT_TOP_SCORES.to_vec(),
            last_rank: None,
        }
    }
}

impl HighScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Rank of the most recent `record` call, for highlighting.
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Insert `score` unless that value is already listed, keep the top ten and return
    /// the 0-based position of `score` (or `None` if it did not make the list).
    pub fn record(&mut self, score: u32) -> Option<usize> {
        if !self.scores.contains(&score) {
            self.scores.push(score);
        }
        self.scores.sort_unstable_by(|a, b| b.cmp(a));
        self.scores.truncate(LEDGER_SIZE);
        self.last_rank = self.scores.iter().position(|s| *s == score);
        self.last_rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_points() {
        assert_eq!(points_for(3, 1.0), 27);
        assert_eq!(points_for(10, 2.0), 2000);
        assert_eq!(points_for(2, 1.2), 9);
        assert_eq!(points_for(5, 1.5), 187);
    }

    #[test]
    fn present_score_is_not_duplicated() {
        let mut l = HighScoreLedger::new();
        assert_eq!(l.record(5120), Some(0));
        assert_eq!(l.scores(), &DEFAULT_TOP_SCORES);
        assert_eq!(l.record(40), Some(7));
        assert_eq!(l.scores(), &DEFAULT_TOP_SCORES);
    }

    #[test]
    fn new_top_score_pushes_out_tail() {
        let mut l = HighScoreLedger::new();
        assert_eq!(l.record(9999), Some(0));
        assert_eq!(
            l.scores(),
            &[9999, 5120, 2560, 1280, 640, 320, 160, 80, 40, 20]
        );
        assert_eq!(l.last_rank(), Some(0));
    }

    #[test]
    fn low_score_misses_the_list() {
        let mut l = HighScoreLedger::new();
        assert_eq!(l.record(5), None);
        assert_eq!(l.scores(), &DEFAULT_TOP_SCORES);
        assert_eq!(l.last_rank(), None);
        assert_eq!(l.record(100), Some(6));
        assert_eq!(l.scores().len(), LEDGER_SIZE);
        assert_eq!(l.scores()[9], 20);
    }
}
