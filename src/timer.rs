//! Round countdown measured in session ticks, not wall-clock time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTimer {
    elapsed_ticks: u64,
    limit_ticks: u64,
    ticks_per_second: u32,
}

impl RoundTimer {
    pub fn new(limit_secs: u32, ticks_per_second: u32) -> Self {
        let tps = ticks_per_second.max(1);
        Self {
            elapsed_ticks: 0,
            limit_ticks: u64::from(limit_secs) * u64::from(tps),
            ticks_per_second: tps,
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_ticks = 0;
    }

    /// Count one tick; stops accumulating once up.
    pub fn tick(&mut self) {
        if !self.is_up() {
            self.elapsed_ticks += 1;
        }
    }

    pub fn is_up(&self) -> bool {
        self.elapsed_ticks >= self.limit_ticks
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Whole seconds left, rounded up so the display reads the limit on the first tick.
    pub fn remaining_secs(&self) -> u32 {
        let left = self.limit_ticks.saturating_sub(self.elapsed_ticks);
        left.div_ceil(u64::from(self.ticks_per_second)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_exactly_at_limit() {
        let mut t = RoundTimer::new(2, 30);
        for _ in 0..59 {
            t.tick();
        }
        assert!(!t.is_up());
        assert_eq!(t.remaining_secs(), 1);
        t.tick();
        assert!(t.is_up());
        assert_eq!(t.remaining_secs(), 0);
        t.tick();
        assert_eq!(t.elapsed_ticks(), 60);
    }

    #[test]
    fn remaining_counts_down_by_second() {
        let mut t = RoundTimer::new(60, 30);
        assert_eq!(t.remaining_secs(), 60);
        t.tick();
        assert_eq!(t.remaining_secs(), 60);
        for _ in 0..29 {
            t.tick();
        }
        assert_eq!(t.remaining_secs(), 59);
        t.reset();
        assert_eq!(t.remaining_secs(), 60);
    }

    #[test]
    fn zero_limit_is_already_up() {
        assert!(RoundTimer::new(0, 30).is_up());
    }
}
