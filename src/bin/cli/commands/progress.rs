use anyhow::Result;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let user = app.current_user()?;
    let summary = app.service.get_progress_summary(&user)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => println!("{}", terminal::render_summary(&summary, use_color)),
    }

    Ok(())
}
