use anyhow::Result;

use lingocards_lib::Settings;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    language: Option<&str>,
    level: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let user = if language.is_some() || level.is_some() {
        let settings = Settings::from_form(language, level)?;
        app.service.start_session_with(settings)?
    } else {
        app.service.start_session()?
    };
    app.remember(&user)?;

    let settings = app.service.settings(&user)?;
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "user": user.to_string(),
                "settings": settings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Started session {}", user);
            println!("Studying {} level {}", settings.target_language, settings.level);
        }
    }

    Ok(())
}
