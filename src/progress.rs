//! Preload progress reporting.
//!
//! Reports observable progress while `lectern preload` (or the background
//! preload behind `lectern serve`) fills the corpus cache, so users can see
//! when search covers every book. Progress is emitted on **stderr** so
//! stdout remains parseable for scripts.

use std::io::Write;
use std::str::FromStr;

use lectern_core::corpus::PreloadProgress;

/// Reports preload progress. Implementations write to stderr (human or JSON).
pub trait PreloadReporter: Send + Sync {
    /// Emit a progress event. Called once per finished book.
    fn report(&self, event: &PreloadProgress);
}

/// Human-friendly progress on stderr: "preload  12 / 66 books  genesis".
pub struct StderrProgress;

impl PreloadReporter for StderrProgress {
    fn report(&self, event: &PreloadProgress) {
        let line = match &event.error {
            None => format!(
                "preload  {} / {} books  {}\n",
                event.done, event.total, event.book
            ),
            Some(error) => format!(
                "preload  {} / {} books  {} FAILED: {}\n",
                event.done, event.total, event.book, error
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl PreloadReporter for JsonProgress {
    fn report(&self, event: &PreloadProgress) {
        let obj = serde_json::json!({
            "event": "progress",
            "phase": "preload",
            "book": event.book,
            "ok": event.error.is_none(),
            "error": event.error,
            "n": event.done,
            "total": event.total
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl PreloadReporter for NoProgress {
    fn report(&self, _event: &PreloadProgress) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn PreloadReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "invalid progress mode '{}'. Use off, human, or json.",
                other
            )),
        }
    }
}
