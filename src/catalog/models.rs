//! Data models for the word catalog

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lowest proficiency level (CEFR A1)
pub const MIN_LEVEL: u8 = 1;

/// Highest proficiency level (CEFR C2)
pub const MAX_LEVEL: u8 = 6;

/// Target language of a translation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    French,
    Spanish,
    German,
    Italian,
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::French,
        Language::Spanish,
        Language::German,
        Language::Italian,
        Language::Portuguese,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::French => "french",
            Language::Spanish => "spanish",
            Language::German => "german",
            Language::Italian => "italian",
            Language::Portuguese => "portuguese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a language, level or word key cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub String);

impl FromStr for Language {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == wanted)
            .ok_or_else(|| ParseError(format!("Unsupported language: '{}'", s.trim())))
    }
}

/// Parse and range-check a proficiency level
pub fn parse_level(s: &str) -> Result<u8, ParseError> {
    let level: u8 = s
        .trim()
        .parse()
        .map_err(|_| ParseError(format!("Invalid level: '{}'", s.trim())))?;
    check_level(level)
}

pub fn check_level(level: u8) -> Result<u8, ParseError> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(ParseError(format!(
            "Level must be between {} and {}, got {}",
            MIN_LEVEL, MAX_LEVEL, level
        )))
    }
}

/// A translatable catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub english: String,
    pub translation: String,
    pub language: Language,
    pub level: u8,
}

impl Word {
    pub fn new(english: &str, translation: &str, language: Language, level: u8) -> Self {
        Self {
            english: english.to_string(),
            translation: translation.to_string(),
            language,
            level,
        }
    }

    /// Identifier of this entry
    pub fn key(&self) -> WordKey {
        WordKey {
            english: self.english.clone(),
            language: self.language,
            level: self.level,
        }
    }

    pub fn matches(&self, key: &WordKey) -> bool {
        self.english == key.english && self.language == key.language && self.level == key.level
    }
}

/// Identifies a catalog entry by `(english, language, level)`.
///
/// The textual form is `language:level:english`, e.g. `french:1:apple`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordKey {
    pub english: String,
    pub language: Language,
    pub level: u8,
}

impl WordKey {
    pub fn new(english: &str, language: Language, level: u8) -> Self {
        Self {
            english: english.to_string(),
            language,
            level,
        }
    }
}

impl fmt::Display for WordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.language, self.level, self.english)
    }
}

impl FromStr for WordKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // English words may contain ':' so only split off the first two fields
        let mut parts = s.splitn(3, ':');
        let (Some(language), Some(level), Some(english)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError(format!(
                "Invalid word key '{}', expected language:level:english",
                s
            )));
        };

        let english = english.trim();
        if english.is_empty() {
            return Err(ParseError(format!("Word key '{}' has no English word", s)));
        }

        Ok(Self {
            english: english.to_string(),
            language: language.parse()?,
            level: parse_level(level)?,
        })
    }
}

/// Restricts the deck to one language and/or level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl DeckFilter {
    /// Filter that accepts every catalog entry
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(language: Language, level: u8) -> Self {
        Self {
            language: Some(language),
            level: Some(level),
        }
    }

    pub fn accepts(&self, word: &Word) -> bool {
        self.language.map_or(true, |lang| lang == word.language)
            && self.level.map_or(true, |level| level == word.level)
    }
}
