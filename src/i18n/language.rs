//! Language type: a configurable site language.
//!
//! Languages are stored as configuration objects (`language.entity.<id>`), so
//! the type round-trips through serde as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left to right
    #[default]
    Ltr,
    /// Right to left
    Rtl,
}

impl Direction {
    /// Get the direction token (`ltr` or `rtl`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }

    /// Normalize a direction token coming from user input.
    ///
    /// Only the exact tokens `ltr` and `rtl` are recognised. Anything else,
    /// including a missing value, is left to right.
    pub fn normalize(value: Option<&str>) -> Direction {
        match value {
            Some("rtl") => Direction::Rtl,
            _ => Direction::Ltr,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configurable language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language code (e.g., "en", "pt-br")
    id: String,

    /// Human readable name (e.g., "English")
    label: String,

    #[serde(default)]
    direction: Direction,

    /// Sort position among the site languages
    #[serde(default)]
    weight: i32,

    /// System languages such as "und" are locked and never listed as configurable
    #[serde(default)]
    locked: bool,
}

impl Language {
    /// Code of the "Not specified" system language.
    pub const NOT_SPECIFIED: &'static str = "und";

    /// Code of the "Not applicable" system language.
    pub const NOT_APPLICABLE: &'static str = "zxx";

    /// Longest language code the site accepts.
    pub const MAX_CODE_LENGTH: usize = 12;

    pub fn new(id: impl Into<String>, label: impl Into<String>, direction: Direction) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            direction,
            weight: 0,
            locked: false,
        }
    }

    /// English, the language a fresh site starts with.
    pub fn site_default() -> Self {
        Self::new("en", "English", Direction::Ltr)
    }

    /// The locked system languages every site carries.
    pub fn locked_defaults() -> Vec<Language> {
        vec![
            Language::locked(Self::NOT_SPECIFIED, "Not specified", 1),
            Language::locked(Self::NOT_APPLICABLE, "Not applicable", 2),
        ]
    }

    fn locked(id: &str, label: &str, weight: i32) -> Self {
        Self {
            locked: true,
            weight,
            ..Self::new(id, label, Direction::Ltr)
        }
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
