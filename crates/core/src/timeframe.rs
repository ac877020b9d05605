//! Report time windows written as `<integer><h|d|w>`.

use std::sync::OnceLock;

use chrono::Duration;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Time;

/// Unit of a [`Timeframe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Hours
    Hours,
    /// Days
    Days,
    /// Weeks
    Weeks,
}

impl TimeUnit {
    fn suffix(self) -> char {
        match self {
            TimeUnit::Hours => 'h',
            TimeUnit::Days => 'd',
            TimeUnit::Weeks => 'w',
        }
    }
}

/// A trailing time window such as `24h`, `7d` or `2w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    /// Number of units
    pub amount: u32,
    /// Unit of `amount`
    pub unit: TimeUnit,
}

impl Default for Timeframe {
    fn default() -> Self {
        Self {
            amount: 24,
            unit: TimeUnit::Hours,
        }
    }
}

/// Longest accepted window, in days.
const MAX_WINDOW_DAYS: i64 = 3650;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(\d+)\s*([hdwHDW])\s*$").expect("static regex"))
}

impl Timeframe {
    /// Parse a timeframe, falling back to 24 hours for anything malformed.
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or_default()
    }

    /// Parse a timeframe, returning `None` when it is malformed, zero or longer
    /// than ten years.
    pub fn try_parse(raw: &str) -> Option<Self> {
        let caps = pattern().captures(raw)?;
        let amount: u32 = caps[1].parse().ok()?;
        if amount == 0 {
            return None;
        }
        let unit = match caps[2].to_ascii_lowercase().as_str() {
            "h" => TimeUnit::Hours,
            "d" => TimeUnit::Days,
            "w" => TimeUnit::Weeks,
            _ => return None,
        };
        let timeframe = Self { amount, unit };
        timeframe
            .try_duration()
            .filter(|d| *d <= Duration::days(MAX_WINDOW_DAYS))
            .map(|_| timeframe)
    }

    fn try_duration(&self) -> Option<Duration> {
        let amount = i64::from(self.amount);
        match self.unit {
            TimeUnit::Hours => Duration::try_hours(amount),
            TimeUnit::Days => Duration::try_days(amount),
            TimeUnit::Weeks => Duration::try_weeks(amount),
        }
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.try_duration().unwrap_or_else(|| Duration::hours(24))
    }

    /// The window `[now - duration, now)`.
    pub fn window(&self, now: Time) -> (Time, Time) {
        let start = now
            .checked_sub_signed(self.duration())
            .unwrap_or_else(|| now - Duration::hours(24));
        (start, now)
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}
