//! `lectern theme`: show, set, or toggle the stored colour theme.

use anyhow::{anyhow, Result};

use lectern_core::kv::KeyValueStore;
use lectern_core::preferences::{load_theme, save_theme, Theme};

/// What to do with the stored theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Set(Theme),
    Toggle,
}

impl ThemeAction {
    /// `None` shows the theme; `"toggle"` flips it; anything else must name a theme.
    pub fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            None => Ok(ThemeAction::Show),
            Some(s) if s.eq_ignore_ascii_case("toggle") => Ok(ThemeAction::Toggle),
            Some(s) => s.parse().map(ThemeAction::Set).map_err(|e: String| anyhow!(e)),
        }
    }
}

/// Apply `action` and return the theme now in effect.
pub async fn apply_theme(kv: &dyn KeyValueStore, action: ThemeAction) -> Result<Theme> {
    let theme = match action {
        ThemeAction::Show => return load_theme(kv).await,
        ThemeAction::Set(theme) => theme,
        ThemeAction::Toggle => load_theme(kv).await?.toggled(),
    };
    save_theme(kv, theme).await?;
    Ok(theme)
}

pub async fn run_theme(kv: &dyn KeyValueStore, action: ThemeAction) -> Result<()> {
    let theme = apply_theme(kv, action).await?;
    println!("{}", theme);
    Ok(())
}
