use anyhow::Result;

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    let user = app.current_user()?;
    app.service.reset_progress(&user)?;
    println!("Progress reset.");
    Ok(())
}
