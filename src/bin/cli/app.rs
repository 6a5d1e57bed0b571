use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use lingocards_lib::{Config, Flashcards, UserId};

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub service: Flashcards,
    pub data_dir: PathBuf,
    user_override: Option<String>,
}

impl App {
    /// Load configuration and open the catalog and progress store
    pub fn new(config_path: Option<&Path>, user: Option<String>) -> Result<Self> {
        let config = Config::load_or_default(config_path)
            .context("Failed to load configuration")?;
        let data_dir = config.data_dir().context("Failed to get data directory")?;
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        let service = config.open_service().context("Failed to open flashcards")?;

        Ok(Self {
            config,
            service,
            data_dir,
            user_override: user,
        })
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join("session")
    }

    /// The user from `--user`, or the remembered session
    pub fn current_user(&self) -> Result<UserId> {
        if let Some(token) = &self.user_override {
            return Ok(token.parse()?);
        }

        match fs::read_to_string(self.session_path()) {
            Ok(token) => token.parse::<UserId>().context("Corrupt session file"),
            Err(_) => bail!("No active session. Run `lingocards-cli start` first."),
        }
    }

    /// The current user, starting a new session if there is none
    pub fn current_or_new_user(&self) -> Result<UserId> {
        match self.current_user() {
            Ok(user) => Ok(user),
            Err(_) if self.user_override.is_none() => {
                let user = self.service.start_session()?;
                self.remember(&user)?;
                Ok(user)
            }
            Err(e) => Err(e),
        }
    }

    /// Make `user` the session used by later commands
    pub fn remember(&self, user: &UserId) -> Result<()> {
        fs::write(self.session_path(), user.to_string())
            .context("Failed to save session token")
    }
}
