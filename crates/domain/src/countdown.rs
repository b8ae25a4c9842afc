use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Time left until a deadline, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    /// `None` once `now` reaches the deadline.
    pub fn until(deadline: u64, now: u64) -> Option<Self> {
        let left = deadline.checked_sub(now).filter(|left| *left > 0)?;
        Some(Self {
            days: left / DAY,
            hours: (left % DAY) / HOUR,
            minutes: (left % HOUR) / MINUTE,
            seconds: left % MINUTE,
        })
    }

    pub fn total_secs(&self) -> u64 {
        self.days * DAY + self.hours * HOUR + self.minutes * MINUTE + self.seconds
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_remaining_split() {
        let left = TimeRemaining::until(DAY + 2 * HOUR + 3 * MINUTE + 4, 0).unwrap();
        assert_eq!(left.to_string(), "1d 2h 3m 4s");
        assert_eq!(left.total_secs(), DAY + 2 * HOUR + 3 * MINUTE + 4);
    }

    #[test]
    fn test_time_remaining_none_at_deadline() {
        assert!(TimeRemaining::until(100, 100).is_none());
        assert!(TimeRemaining::until(100, 250).is_none());
        assert_eq!(TimeRemaining::until(100, 99).map(|t| t.seconds), Some(1));
    }
}
