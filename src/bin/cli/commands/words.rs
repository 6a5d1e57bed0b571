use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let user = app.current_user()?;
    let list = app.service.get_word_list(&user)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Plain => {
            println!(
                "{}",
                terminal::render_word_pairs("Known words:", &list.known_words, Color::GREEN, use_color)
            );
            println!();
            println!(
                "{}",
                terminal::render_word_pairs("Unknown words:", &list.unknown_words, Color::RED, use_color)
            );
        }
    }

    Ok(())
}
