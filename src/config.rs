use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use lectern_core::index::DEFAULT_INDEX_LOCATION;
use lectern_core::models::{BookId, ChapterNumber, NavigationPosition};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub state: StateConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub preload: PreloadConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    /// Directory path or `http(s)://` base URL holding the index and books.
    pub root: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_index() -> String {
    DEFAULT_INDEX_LOCATION.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl CorpusConfig {
    pub fn is_remote(&self) -> bool {
        self.root.starts_with("http://") || self.root.starts_with("https://")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NavigationConfig {
    #[serde(default = "default_book")]
    pub default_book: String,
    #[serde(default = "default_chapter")]
    pub default_chapter: ChapterNumber,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_book: default_book(),
            default_chapter: default_chapter(),
        }
    }
}

fn default_book() -> String {
    "matthew".to_string()
}
fn default_chapter() -> ChapterNumber {
    1
}

impl NavigationConfig {
    /// The configured starting position. Only valid after [`load_config`].
    pub fn default_position(&self) -> Result<NavigationPosition> {
        let book: BookId = self.default_book.parse()?;
        Ok(NavigationPosition::new(book, self.default_chapter))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreloadConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_on_start")]
    pub on_start: bool,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            on_start: default_on_start(),
        }
    }
}

fn default_concurrency() -> usize {
    1
}
fn default_on_start() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            attribution: default_attribution(),
        }
    }
}

fn default_attribution() -> String {
    "— RSB VERSION BY TANQUE JERRY —".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.corpus.root.trim().is_empty() {
        anyhow::bail!("corpus.root must not be empty");
    }

    // Validate navigation
    if BookId::parse(&config.navigation.default_book).is_none() {
        anyhow::bail!(
            "navigation.default_book '{}' is not a known book",
            config.navigation.default_book
        );
    }
    if config.navigation.default_chapter == 0 {
        anyhow::bail!("navigation.default_chapter must be > 0");
    }

    // Validate preload
    if config.preload.concurrency == 0 {
        anyhow::bail!("preload.concurrency must be >= 1");
    }

    if config.corpus.is_remote() && config.corpus.timeout_secs == 0 {
        anyhow::bail!("corpus.timeout_secs must be > 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse(
            r#"
[corpus]
root = "./data"

[state]
path = "./data/lectern.sqlite"
"#,
        )
        .unwrap();
        assert_eq!(config.corpus.index, "index.json");
        assert!(!config.corpus.is_remote());
        assert_eq!(config.preload.concurrency, 1);
        assert_eq!(
            config.navigation.default_position().unwrap().book.as_str(),
            "matthew"
        );
        assert_eq!(config.server.bind, "127.0.0.1:7340");
    }

    #[test]
    fn rejects_unknown_default_book() {
        let err = parse(
            r#"
[corpus]
root = "./data"

[state]
path = "x.sqlite"

[navigation]
default_book = "enoch"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("enoch"));
    }

    #[test]
    fn rejects_zero_concurrency() {
        assert!(parse(
            r#"
[corpus]
root = "https://example.org/bible"

[state]
path = "x.sqlite"

[preload]
concurrency = 0
"#,
        )
        .is_err());
    }
}
