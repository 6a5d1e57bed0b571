//! Data models for per-user progress

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{check_level, parse_level, DeckFilter, Language, ParseError, WordKey};

/// Anonymous session token identifying a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for UserId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| ParseError(format!("Invalid user token: {}", e)))
    }
}

/// Chosen target language and proficiency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub target_language: Language,
    pub level: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_language: Language::French,
            level: 1,
        }
    }
}

impl Settings {
    pub fn new(target_language: Language, level: u8) -> Result<Self, ParseError> {
        Ok(Self {
            target_language,
            level: check_level(level)?,
        })
    }

    /// Build settings from raw form fields; both are required
    pub fn from_form(language: Option<&str>, level: Option<&str>) -> Result<Self, ParseError> {
        let language = language
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ParseError("Missing target language".to_string()))?;
        let level = level
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ParseError("Missing level".to_string()))?;

        Ok(Self {
            target_language: language.parse()?,
            level: parse_level(level)?,
        })
    }

    pub fn filter(&self) -> DeckFilter {
        DeckFilter::new(self.target_language, self.level)
    }
}

/// Map a judgment form action to `known`
pub fn parse_judgment(action: &str) -> Result<bool, ParseError> {
    match action.trim().to_lowercase().as_str() {
        "known" | "k" => Ok(true),
        "unknown" | "u" => Ok(false),
        other => Err(ParseError(format!(
            "Invalid judgment '{}', expected 'known' or 'unknown'",
            other
        ))),
    }
}

/// Where a user is in the study cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Nothing judged yet
    New,
    /// Judging words
    Active,
}

/// A user's judged words and preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default)]
    pub known: BTreeSet<WordKey>,
    #[serde(default)]
    pub unknown: BTreeSet<WordKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    /// Number of times the deck was exhausted and reset
    #[serde(default)]
    pub resets: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            known: BTreeSet::new(),
            unknown: BTreeSet::new(),
            settings: None,
            resets: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a judgment; a word is in exactly one of the two sets afterwards
    pub fn record(&mut self, word: WordKey, known: bool) {
        if known {
            self.unknown.remove(&word);
            self.known.insert(word);
        } else {
            self.known.remove(&word);
            self.unknown.insert(word);
        }
        self.touch();
    }

    pub fn is_known(&self, word: &WordKey) -> bool {
        self.known.contains(word)
    }

    /// Forget every known word (deck exhaustion)
    pub fn clear_known(&mut self) {
        self.known.clear();
        self.resets += 1;
        self.touch();
    }

    /// Forget every judgment; settings are kept
    pub fn clear(&mut self) {
        self.known.clear();
        self.unknown.clear();
        self.touch();
    }

    /// Settings, falling back to French level 1
    pub fn effective_settings(&self) -> Settings {
        self.settings.unwrap_or_default()
    }

    pub fn phase(&self) -> Phase {
        if self.known.is_empty() && self.unknown.is_empty() && self.resets == 0 {
            Phase::New
        } else {
            Phase::Active
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Every user's progress, ordered by user for stable serialization
pub type ProgressMap = BTreeMap<UserId, ProgressState>;

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> WordKey {
        WordKey::new("apple", Language::French, 1)
    }

    #[test]
    fn test_record_moves_between_sets() {
        let mut state = ProgressState::new();

        state.record(apple(), false);
        assert!(state.unknown.contains(&apple()));
        assert!(!state.is_known(&apple()));

        state.record(apple(), true);
        assert!(state.is_known(&apple()));
        assert!(state.unknown.is_empty());
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut state = ProgressState::new();
        state.record(apple(), true);
        state.record(apple(), true);
        assert_eq!(state.known.len(), 1);
        assert_eq!(state.unknown.len(), 0);
    }

    #[test]
    fn test_phase() {
        let mut state = ProgressState::new();
        assert_eq!(state.phase(), Phase::New);

        state.record(apple(), true);
        assert_eq!(state.phase(), Phase::Active);

        state.clear_known();
        assert_eq!(state.resets, 1);
        assert_eq!(state.phase(), Phase::Active);
    }

    #[test]
    fn test_clear_keeps_settings() {
        let mut state = ProgressState::new();
        state.settings = Some(Settings::new(Language::German, 2).unwrap());
        state.record(apple(), true);
        state.record(WordKey::new("car", Language::French, 1), false);

        state.clear();
        assert!(state.known.is_empty());
        assert!(state.unknown.is_empty());
        assert_eq!(state.effective_settings().target_language, Language::German);
    }

    #[test]
    fn test_default_settings() {
        let state = ProgressState::new();
        assert_eq!(state.effective_settings(), Settings::default());
        assert_eq!(Settings::default().target_language, Language::French);
        assert_eq!(Settings::default().level, 1);
    }

    #[test]
    fn test_settings_from_form() {
        let settings = Settings::from_form(Some("spanish"), Some("2")).unwrap();
        assert_eq!(settings.target_language, Language::Spanish);
        assert_eq!(settings.level, 2);

        assert!(Settings::from_form(None, Some("2")).is_err());
        assert!(Settings::from_form(Some("spanish"), None).is_err());
        assert!(Settings::from_form(Some("spanish"), Some("")).is_err());
        assert!(Settings::from_form(Some("spanish"), Some("abc")).is_err());
    }

    #[test]
    fn test_parse_judgment() {
        assert_eq!(parse_judgment("known").unwrap(), true);
        assert_eq!(parse_judgment("Unknown").unwrap(), false);
        assert!(parse_judgment("maybe").is_err());
    }

    #[test]
    fn test_user_id_roundtrip_text() {
        let user = UserId::new();
        let parsed: UserId = user.to_string().parse().unwrap();
        assert_eq!(parsed, user);
        assert!("not-a-token".parse::<UserId>().is_err());
    }

    #[test]
    fn test_progress_map_serializes_user_keys_as_strings() {
        let mut map = ProgressMap::new();
        let user = UserId::new();
        map.insert(user, ProgressState::new());

        let json = serde_json::to_value(&map).unwrap();
        assert!(json.get(user.to_string()).is_some());
    }
}
