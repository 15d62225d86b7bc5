//! Display locales.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Supported display locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    #[default]
    De,
    En,
}

/// Calendar units used when spelling out durations, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Week,
    Day,
    Hour,
    Minute,
}

impl TimeUnit {
    pub const ALL: [Self; 4] = [Self::Week, Self::Day, Self::Hour, Self::Minute];

    pub const fn minutes(self) -> i64 {
        match self {
            Self::Week => 7 * 24 * 60,
            Self::Day => 24 * 60,
            Self::Hour => 60,
            Self::Minute => 1,
        }
    }
}

/// Grammatical case of a unit name. German needs the dative after "vor"/"in".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Nominative,
    Dative,
}

impl Locale {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::De => "de_DE",
            Self::En => "en_US",
        }
    }

    /// Unit name for a count.
    pub const fn unit(self, unit: TimeUnit, count: i64, case: Case) -> &'static str {
        let plural = count != 1;
        match (self, unit, plural) {
            (Self::En, TimeUnit::Week, false) => "week",
            (Self::En, TimeUnit::Week, true) => "weeks",
            (Self::En, TimeUnit::Day, false) => "day",
            (Self::En, TimeUnit::Day, true) => "days",
            (Self::En, TimeUnit::Hour, false) => "hour",
            (Self::En, TimeUnit::Hour, true) => "hours",
            (Self::En, TimeUnit::Minute, false) => "minute",
            (Self::En, TimeUnit::Minute, true) => "minutes",
            (Self::De, TimeUnit::Week, false) => "Woche",
            (Self::De, TimeUnit::Week, true) => "Wochen",
            (Self::De, TimeUnit::Day, false) => "Tag",
            (Self::De, TimeUnit::Day, true) => match case {
                Case::Nominative => "Tage",
                Case::Dative => "Tagen",
            },
            (Self::De, TimeUnit::Hour, false) => "Stunde",
            (Self::De, TimeUnit::Hour, true) => "Stunden",
            (Self::De, TimeUnit::Minute, false) => "Minute",
            (Self::De, TimeUnit::Minute, true) => "Minuten",
        }
    }

    /// Wraps a duration phrase as lying in the past.
    pub fn past(self, phrase: &str) -> String {
        match self {
            Self::De => format!("vor {phrase}"),
            Self::En => format!("{phrase} ago"),
        }
    }

    /// Wraps a duration phrase as lying in the future.
    pub fn future(self, phrase: &str) -> String {
        format!("in {phrase}")
    }

    pub const fn just_now(self) -> &'static str {
        match self {
            Self::De => "gerade eben",
            Self::En => "just now",
        }
    }

    /// `chrono` format string for a medium date-time.
    pub const fn date_time_format(self) -> &'static str {
        match self {
            Self::De => "%d.%m.%Y, %H:%M:%S",
            Self::En => "%b %-d, %Y, %-I:%M:%S %p",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    /// Accepts a bare language (`de`) or a language with region
    /// (`de_DE`, `en-US`); only the language part decides.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" => Ok(Self::De),
            "en" => Ok(Self::En),
            _ => Err(ValidationError::UnsupportedLocale {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.as_str().to_string()
    }
}
