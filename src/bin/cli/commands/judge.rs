use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, word_id: &str, action: &str, format: &OutputFormat) -> Result<()> {
    let user = app.current_user()?;
    app.service.record_form(&user, Some(word_id), Some(action))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "word": word_id, "action": action });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Marked {} as {}", word_id, action),
    }

    Ok(())
}
