use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
pub const DEFAULT_CYCLES_BEFORE_LONG_BREAK: u32 = 4;

/// Which kind of session the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Work,
    Break,
}

impl SessionKind {
    pub fn other(self) -> Self {
        match self {
            SessionKind::Work => SessionKind::Break,
            SessionKind::Break => SessionKind::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Work => "Work",
            SessionKind::Break => "Break",
        }
    }
}

impl std::str::FromStr for SessionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "work" => Ok(SessionKind::Work),
            "break" => Ok(SessionKind::Break),
            other => Err(ValidationError::InvalidValue {
                field: "session".into(),
                message: format!("'{other}' is neither 'work' nor 'break'"),
            }),
        }
    }
}

/// Immutable timer configuration. Durations are whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub long_break_minutes: u32,
    pub cycles_before_long_break: u32,
    pub enabled: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            cycles_before_long_break: DEFAULT_CYCLES_BEFORE_LONG_BREAK,
            enabled: true,
        }
    }
}

impl TimerConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    /// Returns an error if the timer is enabled and any duration or the
    /// cycle count is zero. A disabled configuration is always accepted.
    pub fn new(
        work_minutes: u32,
        break_minutes: u32,
        long_break_minutes: u32,
        cycles_before_long_break: u32,
        enabled: bool,
    ) -> Result<Self, ValidationError> {
        let config = Self {
            work_minutes,
            break_minutes,
            long_break_minutes,
            cycles_before_long_break,
            enabled,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        let fields = [
            ("work_minutes", self.work_minutes),
            ("break_minutes", self.break_minutes),
            ("long_break_minutes", self.long_break_minutes),
            ("cycles_before_long_break", self.cycles_before_long_break),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "must be greater than zero while the timer is enabled".into(),
                });
            }
        }
        Ok(())
    }

    /// Whether the break following `completed_cycles` work sessions is a long one.
    pub fn is_long_break(&self, completed_cycles: u32) -> bool {
        self.cycles_before_long_break > 0
            && completed_cycles > 0
            && completed_cycles % self.cycles_before_long_break == 0
    }

    /// Full length in minutes of a `kind` session given the cycle count.
    pub fn session_minutes(&self, kind: SessionKind, completed_cycles: u32) -> u32 {
        match kind {
            SessionKind::Work => self.work_minutes,
            SessionKind::Break if self.is_long_break(completed_cycles) => self.long_break_minutes,
            SessionKind::Break => self.break_minutes,
        }
    }

    /// Returns a copy with every field set in `patch` replaced.
    pub fn merged(&self, patch: &ConfigPatch) -> Self {
        Self {
            work_minutes: patch.work_minutes.unwrap_or(self.work_minutes),
            break_minutes: patch.break_minutes.unwrap_or(self.break_minutes),
            long_break_minutes: patch.long_break_minutes.unwrap_or(self.long_break_minutes),
            cycles_before_long_break: patch
                .cycles_before_long_break
                .unwrap_or(self.cycles_before_long_break),
            enabled: patch.enabled.unwrap_or(self.enabled),
        }
    }
}

/// Partial configuration used by `reconfigure`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles_before_long_break: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == ConfigPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let cfg = TimerConfig::default();
        assert_eq!(cfg.work_minutes, 25);
        assert_eq!(cfg.break_minutes, 5);
        assert_eq!(cfg.long_break_minutes, 15);
        assert_eq!(cfg.cycles_before_long_break, 4);
        assert!(cfg.enabled);
    }

    #[test]
    fn enabled_config_rejects_zero_durations() {
        assert!(TimerConfig::new(0, 5, 15, 4, true).is_err());
        assert!(TimerConfig::new(25, 5, 15, 0, true).is_err());
    }

    #[test]
    fn disabled_config_always_constructs() {
        let cfg = TimerConfig::new(0, 0, 0, 0, false).unwrap();
        assert!(!cfg.enabled);
        assert!(!cfg.is_long_break(4));
    }

    #[test]
    fn long_break_only_on_multiples() {
        let cfg = TimerConfig::default();
        assert!(!cfg.is_long_break(0));
        assert!(!cfg.is_long_break(3));
        assert!(cfg.is_long_break(4));
        assert!(cfg.is_long_break(8));
        assert_eq!(cfg.session_minutes(SessionKind::Break, 4), 15);
        assert_eq!(cfg.session_minutes(SessionKind::Break, 5), 5);
        assert_eq!(cfg.session_minutes(SessionKind::Work, 4), 25);
    }

    #[test]
    fn merged_only_touches_patched_fields() {
        let cfg = TimerConfig::default();
        let patch = ConfigPatch {
            work_minutes: Some(50),
            ..ConfigPatch::default()
        };
        let merged = cfg.merged(&patch);
        assert_eq!(merged.work_minutes, 50);
        assert_eq!(merged.break_minutes, 5);
        assert!(ConfigPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn session_kind_parses_case_insensitively() {
        assert_eq!("Break".parse::<SessionKind>().unwrap(), SessionKind::Break);
        assert_eq!("work".parse::<SessionKind>().unwrap(), SessionKind::Work);
        assert!("nap".parse::<SessionKind>().is_err());
        assert_eq!(SessionKind::Work.other(), SessionKind::Break);
    }
}
