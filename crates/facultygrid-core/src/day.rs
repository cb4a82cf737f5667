use serde::{Deserialize, Serialize};
use std::fmt;

/// Teaching days, Monday through Saturday.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Maps a day token from the sheet's day column, case-insensitively.
    ///
    /// Only the fixed abbreviations are accepted; `"TU"` and other partial
    /// spellings return `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        let day = match token.trim().to_ascii_uppercase().as_str() {
            "MON" | "MONDAY" => Weekday::Monday,
            "TUE" | "TUES" | "TUESDAY" => Weekday::Tuesday,
            "WED" | "WEDNESDAY" => Weekday::Wednesday,
            "THU" | "THUR" | "THURS" | "THURSDAY" => Weekday::Thursday,
            "FRI" | "FRIDAY" => Weekday::Friday,
            "SAT" | "SATURDAY" => Weekday::Saturday,
            _ => return None,
        };
        Some(day)
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
