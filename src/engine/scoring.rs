use serde::{Deserialize, Serialize};

pub const XP_PER_CORRECT: u32 = 10;
pub const XP_STREAK_BONUS: u32 = 5;
pub const XP_PER_LEVEL: u32 = 100;

/// XP earned by a correct answer that brings the streak to `streak`.
pub fn xp_for_streak(streak: u32) -> u32 {
    let mut xp = XP_PER_CORRECT;
    if streak >= 3 {
        xp += XP_STREAK_BONUS;
    }
    if streak >= 5 {
        xp += XP_STREAK_BONUS;
    }
    if streak >= 10 {
        xp += XP_STREAK_BONUS * 2;
    }
    xp
}

pub fn level_from_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

pub fn xp_to_next_level(xp: u32) -> u32 {
    level_from_xp(xp) * XP_PER_LEVEL - xp
}

/// Stats for the running quiz. `xp`, `level` and `max_streak` survive
/// mode switches and are persisted; the rest is per session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub score: u32,
    pub correct: u32,
    pub total: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub xp: u32,
    pub level: u32,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            score: 0,
            correct: 0,
            total: 0,
            streak: 0,
            max_streak: 0,
            xp: 0,
            level: 1,
        }
    }
}

impl SessionStats {
    pub fn restored(xp: u32, level: u32, max_streak: u32) -> Self {
        let mut stats = Self {
            xp,
            level: level.max(1),
            max_streak,
            ..Self::default()
        };
        stats.update_level();
        stats
    }

    /// Returns the XP gained. Score grows by the same amount.
    pub fn record_correct(&mut self) -> u32 {
        self.total += 1;
        self.correct += 1;
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);

        let gained = xp_for_streak(self.streak);
        self.xp += gained;
        self.score += gained;
        self.update_level();
        gained
    }

    pub fn record_miss(&mut self) {
        self.total += 1;
        self.streak = 0;
    }

    /// Skips only cost the streak.
    pub fn record_skip(&mut self) {
        self.streak = 0;
    }

    pub fn reset_session(&mut self) {
        self.score = 0;
        self.correct = 0;
        self.total = 0;
        self.streak = 0;
    }

    fn update_level(&mut self) {
        self.level = self.level.max(level_from_xp(self.xp));
    }

    /// Percentage of correct answers, rounded; 0 before the first answer.
    pub fn accuracy(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * self.correct as f64 / self.total as f64).round() as u32
    }

    /// Fraction of the current level already earned.
    pub fn level_progress(&self) -> f64 {
        (self.xp % XP_PER_LEVEL) as f64 / XP_PER_LEVEL as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_bonus_tiers() {
        assert_eq!(xp_for_streak(1), 10);
        assert_eq!(xp_for_streak(2), 10);
        assert_eq!(xp_for_streak(3), 15);
        assert_eq!(xp_for_streak(4), 15);
        assert_eq!(xp_for_streak(5), 20);
        assert_eq!(xp_for_streak(9), 20);
        assert_eq!(xp_for_streak(10), 30);
        assert_eq!(xp_for_streak(50), 30);
    }

    #[test]
    fn test_level_starts_at_one() {
        assert_eq!(level_from_xp(0), 1);
        assert_eq!(level_from_xp(99), 1);
        assert_eq!(level_from_xp(100), 2);
        assert_eq!(xp_to_next_level(0), 100);
        assert_eq!(xp_to_next_level(130), 70);
    }

    #[test]
    fn test_level_monotonic_over_gains() {
        let mut stats = SessionStats::default();
        let mut last_level = stats.level;
        for i in 0..40 {
            if i % 7 == 6 {
                stats.record_miss();
            } else {
                stats.record_correct();
            }
            assert!(stats.level >= last_level);
            assert_eq!(stats.level, stats.xp / 100 + 1);
            last_level = stats.level;
        }
    }

    #[test]
    fn test_first_correct_answer() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.record_correct(), 10);
        assert_eq!(stats.xp, 10);
        assert_eq!(stats.score, 10);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.accuracy(), 100);
    }

    #[test]
    fn test_miss_and_skip_reset_streak() {
        let mut stats = SessionStats::default();
        stats.record_correct();
        stats.record_correct();
        stats.record_miss();
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.max_streak, 2);
        assert_eq!(stats.total, 3);

        stats.record_correct();
        stats.record_skip();
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.xp, 30);
    }

    #[test]
    fn test_accuracy_rounding() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.accuracy(), 0);
        stats.record_correct();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.accuracy(), 33);
        stats.record_correct();
        stats.record_correct();
        assert_eq!(stats.accuracy(), 60);
    }

    #[test]
    fn test_reset_session_keeps_progression() {
        let mut stats = SessionStats::restored(250, 3, 7);
        stats.record_correct();
        stats.reset_session();
        assert_eq!(stats.score, 0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.xp, 260);
        assert_eq!(stats.level, 3);
        assert_eq!(stats.max_streak, 7);
    }

    #[test]
    fn test_restored_level_never_below_xp_level() {
        let stats = SessionStats::restored(450, 1, 0);
        assert_eq!(stats.level, 5);
        let stats = SessionStats::restored(0, 4, 0);
        assert_eq!(stats.level, 4);
        assert!((SessionStats::restored(450, 1, 0).level_progress() - 0.5).abs() < 1e-9);
    }
}
