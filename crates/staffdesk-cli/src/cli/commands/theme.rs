//! Theme preference handlers.

use anyhow::Result;
use staffdesk_core::app::AppContext;

pub fn show(app: &AppContext) -> Result<()> {
    println!("{}", app.theme.current()?);
    Ok(())
}

pub fn toggle(app: &AppContext) -> Result<()> {
    let theme = app.theme.toggle()?;
    println!("Theme set to {theme}");
    Ok(())
}
