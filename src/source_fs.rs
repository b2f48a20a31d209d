//! Filesystem document source.
//!
//! Serves the index and book documents from a local directory. Locations
//! are resolved relative to the configured root; absolute locations and
//! `..` components are rejected so an index cannot point outside the root.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use lectern_core::source::DocumentSource;

pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, location: &str) -> Result<PathBuf> {
        let relative = Path::new(location);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => bail!("location escapes corpus root: {}", location),
            }
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentSource for FsSource {
    async fn fetch(&self, location: &str) -> Result<String> {
        let path = self.resolve(location)?;
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    fn describe(&self) -> String {
        format!("filesystem:{}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_relative_locations() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("nt")).unwrap();
        std::fs::write(tmp.path().join("nt/john.json"), "{}").unwrap();

        let source = FsSource::new(tmp.path());
        assert_eq!(source.fetch("nt/john.json").await.unwrap(), "{}");
        assert!(source.fetch("nt/mark.json").await.is_err());
    }

    #[tokio::test]
    async fn rejects_escaping_locations() {
        let tmp = TempDir::new().unwrap();
        let source = FsSource::new(tmp.path());
        assert!(source.fetch("../secret.json").await.is_err());
        assert!(source.fetch("/etc/passwd").await.is_err());
    }
}
