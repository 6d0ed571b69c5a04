use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content locales served by the site.
///
/// The set is fixed: every locale has its own content document, draft and
/// baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    He,
    En,
}

impl Locale {
    /// All supported locales in display order
    pub const ALL: [Locale; 2] = [Locale::He, Locale::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::He => "he",
            Locale::En => "en",
        }
    }

    /// Name of the JSON document that stores this locale's content
    pub fn file_name(&self) -> String {
        format!("site.{}.json", self.as_str())
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::He
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "he" => Ok(Locale::He),
            "en" => Ok(Locale::En),
            other => Err(CommonError::UnsupportedLocale(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale() {
        assert_eq!("he".parse::<Locale>().unwrap(), Locale::He);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!(
            "fr".parse::<Locale>(),
            Err(CommonError::UnsupportedLocale("fr".to_string()))
        );
    }

    #[test]
    fn test_locale_serde_is_lowercase() {
        let json = serde_json::to_string(&Locale::En).unwrap();
        assert_eq!(json, "\"en\"");
        let locale: Locale = serde_json::from_str("\"he\"").unwrap();
        assert_eq!(locale, Locale::He);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(Locale::He.file_name(), "site.he.json");
        assert_eq!(Locale::default(), Locale::He);
    }
}
