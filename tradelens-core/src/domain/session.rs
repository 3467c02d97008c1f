//! Market sessions — fixed hour-of-day bands.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of four fixed trading sessions, keyed by UTC hour of day.
///
/// | Hours    | Session    |
/// |----------|------------|
/// | [0, 8)   | Asia       |
/// | [8, 13)  | London     |
/// | [13, 17) | NY-Overlap |
/// | [17, 22) | NewYork    |
/// | [22, 24) | Asia       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Session {
    Asia,
    London,
    #[serde(rename = "NY-Overlap")]
    NyOverlap,
    NewYork,
}

impl Session {
    /// Canonical ordering, used for ring placement.
    pub const ALL: [Session; 4] = [
        Session::Asia,
        Session::London,
        Session::NyOverlap,
        Session::NewYork,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=7 => Session::Asia,
            8..=12 => Session::London,
            13..=16 => Session::NyOverlap,
            17..=21 => Session::NewYork,
            _ => Session::Asia,
        }
    }

    /// Session of a timestamp. No timezone conversion is applied.
    pub fn of(time: &NaiveDateTime) -> Self {
        Self::from_hour(time.hour())
    }

    pub fn label(self) -> &'static str {
        match self {
            Session::Asia => "Asia",
            Session::London => "London",
            Session::NyOverlap => "NY-Overlap",
            Session::NewYork => "NewYork",
        }
    }

    /// Parse a label as written by [`Session::label`], case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
