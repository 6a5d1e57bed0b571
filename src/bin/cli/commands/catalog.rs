use std::path::Path;

use anyhow::{bail, Context, Result};

use lingocards_lib::{Catalog, DeckFilter, Language};

use crate::app::App;
use crate::OutputFormat;

/// Write the built-in word list to the configured catalog path
pub fn run_init(app: &App, force: bool) -> Result<()> {
    let path = app.config.catalog_path()?;
    if path.exists() && !force {
        bail!("Catalog already exists at {} (use --force to overwrite)", path.display());
    }

    let catalog = Catalog::builtin();
    catalog.save(&path).context("Failed to write catalog")?;
    println!("Wrote {} words to {}", catalog.len(), path.display());
    Ok(())
}

pub fn run_show(
    app: &App,
    language: Option<&str>,
    level: Option<u8>,
    format: &OutputFormat,
) -> Result<()> {
    let filter = DeckFilter {
        language: language.map(str::parse::<Language>).transpose()?,
        level,
    };
    let words: Vec<_> = app.service.catalog().filtered(&filter).collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&words)?),
        OutputFormat::Plain => {
            for word in &words {
                println!(
                    "{:<12} {:<16} {:<11} {}",
                    word.english, word.translation, word.language, word.level
                );
            }
            println!("({} words)", words.len());
        }
    }

    Ok(())
}

/// Convert a legacy single-language flashcard file into the catalog
pub fn run_migrate(app: &App, legacy: &Path, language: &str, force: bool) -> Result<()> {
    let language: Language = language.parse()?;
    let path = app.config.catalog_path()?;
    if path.exists() && !force {
        bail!("Catalog already exists at {} (use --force to overwrite)", path.display());
    }

    let catalog = Catalog::from_legacy(legacy, language)
        .with_context(|| format!("Failed to read {}", legacy.display()))?;
    catalog.save(&path).context("Failed to write catalog")?;
    println!("Migrated {} words to {}", catalog.len(), path.display());
    Ok(())
}
