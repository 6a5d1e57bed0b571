//! Configuration file (`config.toml`)
//!
//! ```toml
//! data_dir = "/home/me/.local/share/lingocards"
//! catalog = "catalog.json"
//!
//! [store]
//! backend = "json"          # or "sqlite"
//! path = "progress.json"
//! cache_refresh_secs = 10   # 0 disables the cache
//! ```
//!
//! Relative paths are resolved against `data_dir`. Every key is optional.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::progress::{CachedStore, JsonFileStore, ProgressStore, SqliteStore, StorageError};
use crate::service::Flashcards;

const APP_DIR: &str = "lingocards";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: Option<PathBuf>,
    pub cache_refresh_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Json,
            path: None,
            cache_refresh_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub catalog: PathBuf,
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            catalog: PathBuf::from("catalog.json"),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// `<config dir>/lingocards/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    /// Load a config file; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config: Config = toml::from_str(&content)?;
                log::debug!("Loaded config from {:?}", path);
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from `path`, or from the default location
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|p| p.join(APP_DIR))
                .ok_or(ConfigError::DataDirNotFound),
        }
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.data_dir()?.join(path))
        }
    }

    pub fn catalog_path(&self) -> Result<PathBuf> {
        self.resolve(&self.catalog)
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => self.resolve(path),
            None => self.resolve(Path::new(match self.store.backend {
                StoreBackend::Json => "progress.json",
                StoreBackend::Sqlite => "progress.db",
            })),
        }
    }

    pub fn cache_refresh_interval(&self) -> Option<Duration> {
        match self.store.cache_refresh_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Open the configured progress store
    pub fn open_store(&self) -> Result<Box<dyn ProgressStore>> {
        let path = self.store_path()?;
        log::debug!("Opening {:?} progress store at {:?}", self.store.backend, path);

        let store: Box<dyn ProgressStore> = match self.store.backend {
            StoreBackend::Json => {
                let json = JsonFileStore::new(path);
                match self.cache_refresh_interval() {
                    Some(interval) => {
                        Box::new(CachedStore::with_refresh_interval(json, Some(interval)))
                    }
                    None => Box::new(json),
                }
            }
            StoreBackend::Sqlite => Box::new(SqliteStore::open(&path)?),
        };
        Ok(store)
    }

    pub fn open_catalog(&self) -> Result<Catalog> {
        Ok(Catalog::load_or_builtin(&self.catalog_path()?)?)
    }

    /// Build the service from this configuration
    pub fn open_service(&self) -> Result<Flashcards> {
        let catalog = Arc::new(self.open_catalog()?);
        Ok(Flashcards::new(catalog, self.open_store()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_refresh_interval(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_parse_full_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
                data_dir = "/srv/cards"
                catalog = "words.json"

                [store]
                backend = "sqlite"
                cache_refresh_secs = 0
            "#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.cache_refresh_interval(), None);
        assert_eq!(config.catalog_path().unwrap(), PathBuf::from("/srv/cards/words.json"));
        assert_eq!(config.store_path().unwrap(), PathBuf::from("/srv/cards/progress.db"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[store]\nbackend = \"redis\"\n").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_open_service() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };

        let service = config.open_service().unwrap();
        assert_eq!(service.catalog().len(), 40);

        let user = service.start_session().unwrap();
        assert!(service.get_next_word(&user, None).unwrap().is_some());
        assert!(temp.path().join("progress.json").exists());
    }
}
