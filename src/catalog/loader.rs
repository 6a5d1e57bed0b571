//! Loading the word catalog
//!
//! The catalog is a JSON array of words:
//! ```json
//! [{ "english": "apple", "translation": "pomme", "language": "french", "level": 1 }]
//! ```
//! It is read once at startup and never modified afterwards.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::models::*;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Immutable collection of words shared by every request
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    words: Vec<Word>,
}

impl Catalog {
    pub fn from_words(words: Vec<Word>) -> Self {
        let mut seen = HashSet::new();
        for word in &words {
            if !seen.insert(word.key()) {
                log::warn!("Duplicate catalog entry: {}", word.key());
            }
        }
        Self { words }
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let words: Vec<Word> = serde_json::from_str(&content)?;

        for word in &words {
            if word.english.trim().is_empty() {
                return Err(CatalogError::Invalid("entry with empty English word".to_string()));
            }
            check_level(word.level).map_err(|e| {
                CatalogError::Invalid(format!("{} ({})", e, word.english))
            })?;
        }

        log::info!("Loaded {} catalog words from {:?}", words.len(), path);
        Ok(Self::from_words(words))
    }

    /// Load the catalog at `path`, or the built-in word list if the file is absent
    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No catalog at {:?}, using built-in word list", path);
            Ok(Self::builtin())
        }
    }

    /// Write the catalog as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.words)?)?;
        Ok(())
    }

    /// Import a legacy single-language flashcard file.
    ///
    /// Entries look like `{"english": "apple", "french": "pomme", "level": 1}`:
    /// the translation is stored under the language's own name.
    pub fn from_legacy(path: &Path, language: Language) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let entries: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(&content)?;

        let mut words = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let field = |name: &str| {
                entry
                    .get(name)
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        CatalogError::Invalid(format!("entry {} has no '{}' field", index, name))
                    })
            };
            let english = field("english")?;
            let translation = field(language.as_str())?;
            let level = entry
                .get("level")
                .and_then(legacy_level)
                .ok_or_else(|| {
                    CatalogError::Invalid(format!("entry {} has no valid 'level'", index))
                })?;
            let level = check_level(level)
                .map_err(|e| CatalogError::Invalid(format!("entry {}: {}", index, e)))?;

            words.push(Word {
                english,
                translation,
                language,
                level,
            });
        }

        log::info!(
            "Migrated {} legacy {} flashcards from {:?}",
            words.len(),
            language,
            path
        );
        Ok(Self::from_words(words))
    }

    /// The seed word list: five languages, levels A1 to B1
    pub fn builtin() -> Self {
        let rows: &[(&str, [&str; 5], u8)] = &[
            ("apple", ["pomme", "manzana", "Apfel", "mela", "maçã"], 1),
            ("house", ["maison", "casa", "Haus", "casa", "casa"], 1),
            ("car", ["voiture", "coche", "Auto", "macchina", "carro"], 1),
            ("happy", ["heureux", "feliz", "glücklich", "felice", "feliz"], 1),
            ("train", ["train", "tren", "Zug", "treno", "trem"], 2),
            ("delicious", ["délicieux", "delicioso", "köstlich", "delizioso", "delicioso"], 2),
            ("experience", ["expérience", "experiencia", "Erfahrung", "esperienza", "experiência"], 3),
            ("amazing", ["incroyable", "increíble", "erstaunlich", "sorprendente", "surpreendente"], 3),
        ];

        let mut words = Vec::with_capacity(rows.len() * Language::ALL.len());
        for (column, language) in Language::ALL.into_iter().enumerate() {
            for (english, translations, level) in rows {
                words.push(Word::new(english, translations[column], language, *level));
            }
        }
        Self { words }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Find the entry for a key (first match if the catalog has duplicates)
    pub fn get(&self, key: &WordKey) -> Option<&Word> {
        self.words.iter().find(|w| w.matches(key))
    }

    pub fn contains(&self, key: &WordKey) -> bool {
        self.get(key).is_some()
    }

    /// Entries accepted by a filter
    pub fn filtered<'a>(&'a self, filter: &'a DeckFilter) -> impl Iterator<Item = &'a Word> + 'a {
        self.words.iter().filter(move |w| filter.accepts(w))
    }
}

/// Legacy files store the level either as a number or as a numeric string
fn legacy_level(value: &serde_json::Value) -> Option<u8> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 40);

        let apple = catalog.get(&WordKey::new("apple", Language::French, 1)).unwrap();
        assert_eq!(apple.translation, "pomme");

        let amazing = catalog.get(&WordKey::new("amazing", Language::German, 3)).unwrap();
        assert_eq!(amazing.translation, "erstaunlich");

        let french_a1 = DeckFilter::new(Language::French, 1);
        assert_eq!(catalog.filtered(&french_a1).count(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.json");

        Catalog::builtin().save(&path).unwrap();
        let loaded = Catalog::load(&path).unwrap();

        assert_eq!(loaded.words(), Catalog::builtin().words());
    }

    #[test]
    fn test_load_rejects_bad_level() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.json");
        fs::write(
            &path,
            r#"[{"english":"apple","translation":"pomme","language":"french","level":9}]"#,
        )
        .unwrap();

        assert!(matches!(Catalog::load(&path), Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_load_or_builtin_without_file() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::load_or_builtin(&temp.path().join("missing.json")).unwrap();
        assert_eq!(catalog.len(), 40);
    }

    #[test]
    fn test_from_legacy() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flashcards.json");
        fs::write(
            &path,
            r#"[
                {"english": "apple", "french": "pomme", "level": 1},
                {"english": "train", "french": "train", "level": "2"}
            ]"#,
        )
        .unwrap();

        let catalog = Catalog::from_legacy(&path, Language::French).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.words()[0], Word::new("apple", "pomme", Language::French, 1));
        assert_eq!(catalog.words()[1].level, 2);
    }

    #[test]
    fn test_from_legacy_missing_translation() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flashcards.json");
        fs::write(&path, r#"[{"english": "apple", "french": "pomme", "level": 1}]"#).unwrap();

        let result = Catalog::from_legacy(&path, Language::Spanish);
        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_duplicates_are_tolerated() {
        let catalog = Catalog::from_words(vec![
            Word::new("apple", "pomme", Language::French, 1),
            Word::new("apple", "pomme rouge", Language::French, 1),
        ]);
        assert_eq!(catalog.len(), 2);
        let apple = catalog.get(&WordKey::new("apple", Language::French, 1)).unwrap();
        assert_eq!(apple.translation, "pomme");
    }
}
