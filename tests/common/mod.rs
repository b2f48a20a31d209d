//! Shared corpus fixture for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const GENESIS: &str = r#"{
  "1": {
    "1": "In the beginning God created the heaven and the earth.",
    "2": "And the earth was without form, and void; and darkness was upon the face of the deep.",
    "3": "And God said, Let there be light: and there was light."
  },
  "2": {
    "1": "Thus the heavens and the earth were finished, and all the host of them."
  }
}"#;

pub const PSALMS: &str = r#"{
  "1": { "1": "Blessed is the man that walketh not in the counsel of the ungodly." },
  "23": { "1": "The LORD is my shepherd; I shall not want." },
  "150": { "6": "Let every thing that hath breath praise the LORD. Praise ye the LORD." }
}"#;

pub const MATTHEW: &str = r#"{
  "1": { "1": "The book of the generation of Jesus Christ, the son of David, the son of Abraham." },
  "2": { "1": "Now when Jesus was born in Bethlehem of Judaea" }
}"#;

pub const JOHN: &str = r#"{
  "1": { "1": "In the beginning was the Word, and the Word was with God, and the Word was God." },
  "3": {
    "16": "For God so loved the world, that he gave his only begotten Son",
    "17": "For God sent not his Son into the world to condemn the world"
  }
}"#;

pub const FIRST_JOHN: &str = r#"{
  "4": { "8": "He that loveth not knoweth not God; for God is love." }
}"#;

pub const INDEX: &str = r#"{
  "genesis": "ot/genesis.json",
  "psalms": "ot/psalms.json",
  "matthew": "nt/matthew.json",
  "john": "nt/john.json",
  "apocrypha": "extra/tobit.json"
}"#;

/// Write the fixture corpus under `<root>/corpus`.
///
/// Genesis, Psalms, Matthew and John are reached through the index; 1 John
/// is only reachable through the `<book>.json` fallback. Every other book
/// is missing.
pub fn write_corpus(root: &Path, with_index: bool) -> PathBuf {
    let corpus = root.join("corpus");
    fs::create_dir_all(corpus.join("ot")).unwrap();
    fs::create_dir_all(corpus.join("nt")).unwrap();
    fs::write(corpus.join("ot/genesis.json"), GENESIS).unwrap();
    fs::write(corpus.join("ot/psalms.json"), PSALMS).unwrap();
    fs::write(corpus.join("nt/matthew.json"), MATTHEW).unwrap();
    fs::write(corpus.join("nt/john.json"), JOHN).unwrap();
    fs::write(corpus.join("1john.json"), FIRST_JOHN).unwrap();
    if with_index {
        fs::write(corpus.join("index.json"), INDEX).unwrap();
    }
    corpus
}

/// Write a config file pointing at `corpus` and return its path.
pub fn write_config(root: &Path, corpus: &Path, port: u16, preload_on_start: bool) -> PathBuf {
    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let content = format!(
        r#"[corpus]
root = "{}"

[state]
path = "{}/data/state.sqlite"

[preload]
concurrency = 4
on_start = {}

[export]
attribution = "-- TEST EDITION --"

[server]
bind = "127.0.0.1:{}"
"#,
        corpus.display(),
        root.display(),
        preload_on_start,
        port
    );

    let path = config_dir.join("lectern.toml");
    fs::write(&path, content).unwrap();
    path
}

/// A temp dir with the indexed fixture corpus and a config file.
pub fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let corpus = write_corpus(tmp.path(), true);
    let config = write_config(tmp.path(), &corpus, 7341, false);
    (tmp, config)
}
