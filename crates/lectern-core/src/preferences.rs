//! Persisted reader preferences.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::kv::KeyValueStore;

/// Key holding the last viewed book name.
pub const LAST_VIEWED_BOOK: &str = "lastViewedBook";
/// Key holding the last viewed chapter number.
pub const LAST_VIEWED_CHAPTER: &str = "lastViewedChapter";
/// Key holding the colour theme.
pub const THEME: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}. Use light or dark.", other)),
        }
    }
}

/// Stored theme; missing or unrecognised values read as [`Theme::Light`].
pub async fn load_theme(kv: &dyn KeyValueStore) -> Result<Theme> {
    let stored = kv.get(THEME).await?;
    Ok(stored
        .and_then(|value| value.parse().ok())
        .unwrap_or_default())
}

pub async fn save_theme(kv: &dyn KeyValueStore, theme: Theme) -> Result<()> {
    kv.set(THEME, theme.as_str()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKv;

    #[tokio::test]
    async fn theme_defaults_to_light() {
        let kv = InMemoryKv::new();
        assert_eq!(load_theme(&kv).await.unwrap(), Theme::Light);
        kv.set(THEME, "sepia").await.unwrap();
        assert_eq!(load_theme(&kv).await.unwrap(), Theme::Light);
    }

    #[tokio::test]
    async fn theme_round_trips() {
        let kv = InMemoryKv::new();
        save_theme(&kv, Theme::Light.toggled()).await.unwrap();
        assert_eq!(kv.get(THEME).await.unwrap().as_deref(), Some("dark"));
        assert_eq!(load_theme(&kv).await.unwrap(), Theme::Dark);
    }
}
