//! Supported citation styles
//!
//! The style set is closed; each variant maps to a pure formatting function
//! in [`super::format`] rather than open virtual dispatch.

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CitationStyle {
    Apa,
    Mla,
    Ieee,
    Chicago,
    Harvard,
    Vancouver,
    Bibtex,
}

impl CitationStyle {
    /// All supported styles, in presentation order
    pub const ALL: [CitationStyle; 7] = [
        CitationStyle::Apa,
        CitationStyle::Mla,
        CitationStyle::Ieee,
        CitationStyle::Chicago,
        CitationStyle::Harvard,
        CitationStyle::Vancouver,
        CitationStyle::Bibtex,
    ];

    /// Canonical upper-case name, as used in API query parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationStyle::Apa => "APA",
            CitationStyle::Mla => "MLA",
            CitationStyle::Ieee => "IEEE",
            CitationStyle::Chicago => "CHICAGO",
            CitationStyle::Harvard => "HARVARD",
            CitationStyle::Vancouver => "VANCOUVER",
            CitationStyle::Bibtex => "BIBTEX",
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitationStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "APA" => Ok(CitationStyle::Apa),
            "MLA" => Ok(CitationStyle::Mla),
            "IEEE" => Ok(CitationStyle::Ieee),
            "CHICAGO" => Ok(CitationStyle::Chicago),
            "HARVARD" => Ok(CitationStyle::Harvard),
            "VANCOUVER" => Ok(CitationStyle::Vancouver),
            "BIBTEX" => Ok(CitationStyle::Bibtex),
            _ => Err(AppError::InvalidStyle {
                style: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("apa".parse::<CitationStyle>().unwrap(), CitationStyle::Apa);
        assert_eq!("IEEE".parse::<CitationStyle>().unwrap(), CitationStyle::Ieee);
        assert_eq!(
            "Vancouver".parse::<CitationStyle>().unwrap(),
            CitationStyle::Vancouver
        );
    }

    #[test]
    fn test_parse_unknown_style() {
        let err = "APA7".parse::<CitationStyle>().unwrap_err();
        assert!(matches!(err, AppError::InvalidStyle { ref style } if style == "APA7"));
    }

    #[test]
    fn test_roundtrip_all() {
        for style in CitationStyle::ALL {
            assert_eq!(style.as_str().parse::<CitationStyle>().unwrap(), style);
        }
    }
}
