use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::app::App;
use crate::render::terminal;

/// Interactive loop: show a word, reveal it, read a judgment
pub fn run(app: &App, use_color: bool) -> Result<()> {
    let user = app.current_or_new_user()?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Press Enter to reveal, then k (known), u (unknown) or q (quit).");

    loop {
        let Some(word) = app.service.get_next_word(&user, None)? else {
            println!("No words available.");
            break;
        };

        println!();
        println!("{}", terminal::render_card_front(&word, use_color));
        prompt("")?;
        if lines.next().transpose()?.is_none() {
            break;
        }
        println!("{}", terminal::render_card_back(&word, use_color));

        let action = loop {
            prompt("[k/u/q] ")?;
            match lines.next().transpose()? {
                None => return Ok(()),
                Some(line) => match line.trim().to_lowercase().as_str() {
                    "q" | "quit" => return Ok(()),
                    "k" | "known" => break "known",
                    "u" | "unknown" => break "unknown",
                    _ => continue,
                },
            }
        };

        app.service.record_form(&user, Some(&word.id), Some(action))?;
    }

    Ok(())
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    io::stdout().flush()?;
    Ok(())
}
