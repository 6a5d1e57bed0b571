mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lingocards-cli", about = "Vocabulary flashcards in the terminal", version)]
struct Cli {
    /// Config file (default: <config dir>/lingocards/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session token to act as (default: the last started session)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new session
    Start {
        /// Target language (french, spanish, german, italian, portuguese)
        #[arg(long)]
        language: Option<String>,
        /// Proficiency level (1-6)
        #[arg(long)]
        level: Option<String>,
    },

    /// Show the next flashcard
    Next,

    /// Record a judgment for a word
    Judge {
        /// Word id as printed by `next` (language:level:english)
        word: String,
        /// "known" or "unknown"
        action: String,
    },

    /// Study interactively
    Study,

    /// Show or change the target language and level
    Settings {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        level: Option<String>,
    },

    /// Show known/unknown counts
    Progress,

    /// List known and unknown words with translations
    Words,

    /// Forget all judgments of the current session
    Reset,

    /// Manage the word catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Write the built-in word list to the catalog file
    Init {
        /// Overwrite an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// List catalog words
    Show {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        level: Option<u8>,
    },

    /// Import a legacy flashcards.json with one translation column
    Migrate {
        /// Legacy file path
        file: PathBuf,
        /// Language whose column holds the translation
        #[arg(long, default_value = "french")]
        language: String,
        /// Overwrite an existing catalog
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.config.as_deref(), cli.user)?;

    match cli.command.unwrap_or(Command::Study) {
        Command::Start { language, level } => {
            commands::start::run(&app, language.as_deref(), level.as_deref(), &cli.format)?;
        }
        Command::Next => {
            commands::next::run(&app, &cli.format, use_color)?;
        }
        Command::Judge { word, action } => {
            commands::judge::run(&app, &word, &action, &cli.format)?;
        }
        Command::Study => {
            commands::study::run(&app, use_color)?;
        }
        Command::Settings { language, level } => {
            commands::settings::run(&app, language.as_deref(), level.as_deref(), &cli.format)?;
        }
        Command::Progress => {
            commands::progress::run(&app, &cli.format, use_color)?;
        }
        Command::Words => {
            commands::words::run(&app, &cli.format, use_color)?;
        }
        Command::Reset => {
            commands::reset::run(&app)?;
        }
        Command::Catalog(subcmd) => match subcmd {
            CatalogCommand::Init { force } => {
                commands::catalog::run_init(&app, force)?;
            }
            CatalogCommand::Show { language, level } => {
                commands::catalog::run_show(&app, language.as_deref(), level, &cli.format)?;
            }
            CatalogCommand::Migrate { file, language, force } => {
                commands::catalog::run_migrate(&app, &file, &language, force)?;
            }
        },
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
