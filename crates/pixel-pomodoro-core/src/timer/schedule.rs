use serde::{Deserialize, Serialize};

use super::Phase;
use crate::error::ConfigError;

pub const DEFAULT_WORK_SECS: u64 = 25 * 60;
pub const DEFAULT_SHORT_BREAK_SECS: u64 = 5 * 60;
pub const DEFAULT_LONG_BREAK_SECS: u64 = 15 * 60;
pub const DEFAULT_LONG_BREAK_EVERY: u64 = 4;

/// Interval lengths and long-break cadence for a session.
///
/// Only obtainable through [`SessionConfig::new`] or [`Default`], so a
/// machine never sees a zero duration or a zero cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    work_secs: u64,
    short_break_secs: u64,
    long_break_secs: u64,
    long_break_every: u64,
    auto_resume: bool,
}

/// One entry of a cycle preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStep {
    pub phase: Phase,
    pub duration_secs: u64,
}

impl SessionConfig {
    /// Validate and build a config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any duration or the cadence
    /// is zero.
    pub fn new(
        work_secs: u64,
        short_break_secs: u64,
        long_break_secs: u64,
        long_break_every: u64,
    ) -> Result<Self, ConfigError> {
        for (key, value) in [
            ("work_secs", work_secs),
            ("short_break_secs", short_break_secs),
            ("long_break_secs", long_break_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(key, "duration must be at least one second"));
            }
        }
        if long_break_every == 0 {
            return Err(ConfigError::invalid(
                "long_break_every",
                "cadence must be at least one work session",
            ));
        }
        Ok(Self {
            work_secs,
            short_break_secs,
            long_break_secs,
            long_break_every,
            auto_resume: false,
        })
    }

    /// Start the next phase immediately after a boundary instead of waiting
    /// for another `start()`.
    pub fn with_auto_resume(mut self, auto_resume: bool) -> Self {
        self.auto_resume = auto_resume;
        self
    }

    pub fn work_secs(&self) -> u64 {
        self.work_secs
    }

    pub fn short_break_secs(&self) -> u64 {
        self.short_break_secs
    }

    pub fn long_break_secs(&self) -> u64 {
        self.long_break_secs
    }

    pub fn long_break_every(&self) -> u64 {
        self.long_break_every
    }

    pub fn auto_resume(&self) -> bool {
        self.auto_resume
    }

    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_secs,
            Phase::ShortBreak => self.short_break_secs,
            Phase::LongBreak => self.long_break_secs,
        }
    }

    /// Phase that follows `phase`, given the work-session count *after* any
    /// increment for the phase that just ended.
    pub fn next_phase(&self, phase: Phase, completed_work_sessions: u64) -> Phase {
        match phase {
            Phase::Work if completed_work_sessions % self.long_break_every == 0 => {
                Phase::LongBreak
            }
            Phase::Work => Phase::ShortBreak,
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        }
    }

    /// One full cadence: `long_break_every` work phases, each followed by its
    /// break, the last one long.
    pub fn cycle(&self) -> Vec<CycleStep> {
        let mut steps = Vec::with_capacity(self.long_break_every as usize * 2);
        for completed in 1..=self.long_break_every {
            steps.push(CycleStep {
                phase: Phase::Work,
                duration_secs: self.work_secs,
            });
            let phase = self.next_phase(Phase::Work, completed);
            steps.push(CycleStep {
                phase,
                duration_secs: self.duration_of(phase),
            });
        }
        steps
    }

    /// Total seconds in one full cadence.
    pub fn cycle_secs(&self) -> u64 {
        self.cycle()
            .iter()
            .map(|s| s.duration_secs)
            .fold(0u64, u64::saturating_add)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_secs: DEFAULT_WORK_SECS,
            short_break_secs: DEFAULT_SHORT_BREAK_SECS,
            long_break_secs: DEFAULT_LONG_BREAK_SECS,
            long_break_every: DEFAULT_LONG_BREAK_EVERY,
            auto_resume: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_durations() {
        assert!(SessionConfig::new(0, 1, 1, 4).is_err());
        assert!(SessionConfig::new(1, 0, 1, 4).is_err());
        assert!(SessionConfig::new(1, 1, 0, 4).is_err());
    }

    #[test]
    fn rejects_zero_cadence() {
        let err = SessionConfig::new(1, 1, 1, 0).unwrap_err();
        assert!(err.to_string().contains("long_break_every"));
    }

    #[test]
    fn every_fourth_work_session_earns_long_break() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.next_phase(Phase::Work, 1), Phase::ShortBreak);
        assert_eq!(cfg.next_phase(Phase::Work, 3), Phase::ShortBreak);
        assert_eq!(cfg.next_phase(Phase::Work, 4), Phase::LongBreak);
        assert_eq!(cfg.next_phase(Phase::Work, 8), Phase::LongBreak);
        assert_eq!(cfg.next_phase(Phase::ShortBreak, 3), Phase::Work);
        assert_eq!(cfg.next_phase(Phase::LongBreak, 4), Phase::Work);
    }

    #[test]
    fn cadence_of_one_is_always_long() {
        let cfg = SessionConfig::new(10, 2, 5, 1).unwrap();
        assert_eq!(cfg.next_phase(Phase::Work, 1), Phase::LongBreak);
        assert_eq!(cfg.next_phase(Phase::Work, 2), Phase::LongBreak);
    }

    #[test]
    fn default_cycle() {
        let cfg = SessionConfig::default();
        let phases: Vec<Phase> = cfg.cycle().iter().map(|s| s.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Work,
                Phase::ShortBreak,
                Phase::Work,
                Phase::ShortBreak,
                Phase::Work,
                Phase::ShortBreak,
                Phase::Work,
                Phase::LongBreak,
            ]
        );
        assert_eq!(cfg.cycle_secs(), 4 * 1500 + 3 * 300 + 900);
    }

    #[test]
    fn auto_resume_defaults_off() {
        assert!(!SessionConfig::default().auto_resume());
        let cfg = SessionConfig::default().with_auto_resume(true);
        assert!(cfg.auto_resume());
    }
}
