use anyhow::Result;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let user = app.current_or_new_user()?;
    let word = app.service.get_next_word(&user, None)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&word)?);
        }
        OutputFormat::Plain => match word {
            Some(word) => {
                println!("{}", terminal::render_card_front(&word, use_color));
                println!("{}", terminal::render_card_back(&word, use_color));
                println!();
                println!("Judge with: lingocards-cli judge '{}' known|unknown", word.id);
            }
            None => println!("No words available."),
        },
    }

    Ok(())
}
