use anyhow::Result;

use lingocards_lib::Settings;

use crate::app::App;
use crate::OutputFormat;

/// Show the current settings, or change them when both fields are given
pub fn run(
    app: &App,
    language: Option<&str>,
    level: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let user = app.current_or_new_user()?;

    if language.is_some() || level.is_some() {
        let settings = Settings::from_form(language, level)?;
        app.service.update_settings(&user, settings)?;
    }

    let settings = app.service.settings(&user)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
        OutputFormat::Plain => {
            println!("Language: {}", settings.target_language);
            println!("Level:    {}", settings.level);
        }
    }

    Ok(())
}
