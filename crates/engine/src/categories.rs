//! Closed set of spending categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Food,
    Transportation,
    Entertainment,
    Utilities,
    Shopping,
    Healthcare,
    Travel,
    Education,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Self::Food,
        Self::Transportation,
        Self::Entertainment,
        Self::Utilities,
        Self::Shopping,
        Self::Healthcare,
        Self::Travel,
        Self::Education,
        Self::Other,
    ];

    /// Returns the canonical name used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "FOOD",
            Self::Transportation => "TRANSPORTATION",
            Self::Entertainment => "ENTERTAINMENT",
            Self::Utilities => "UTILITIES",
            Self::Shopping => "SHOPPING",
            Self::Healthcare => "HEALTHCARE",
            Self::Travel => "TRAVEL",
            Self::Education => "EDUCATION",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses user input: trimmed, NFKC-normalized and matched case-insensitively.
///
/// Blank input is not handled here; callers report it as `BlankCategory`.
impl FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.trim().nfkc().collect::<String>().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == key)
            .ok_or_else(|| EngineError::InvalidCategory(s.to_string()))
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_canonical_name_parses_back() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn input_is_matched_case_insensitively() {
        assert_eq!(" food ".parse::<Category>(), Ok(Category::Food));
        assert_eq!("Travel".parse::<Category>(), Ok(Category::Travel));
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!("ＯＴＨＥＲ".parse::<Category>(), Ok(Category::Other));
    }

    #[test]
    fn unknown_category_keeps_original_value() {
        assert_eq!(
            "GROCERIES".parse::<Category>(),
            Err(EngineError::InvalidCategory("GROCERIES".to_string()))
        );
    }

    #[test]
    fn serializes_upper_case() {
        let json = serde_json::to_string(&Category::Healthcare).unwrap();
        assert_eq!(json, "\"HEALTHCARE\"");
    }
}
