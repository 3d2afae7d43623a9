//! `skill-activation.log`: an optional append-only JSONL debug trail.
//!
//! The pipeline is handed an [`ActivationLog`] once at startup; with debug
//! logging off it gets [`NoopActivationLog`] and never touches the disk.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use {serde_json::Value, tracing::warn};

use crate::error::{Context, Result};

/// File name of the debug log inside the log directory.
pub const LOG_FILE: &str = "skill-activation.log";

/// Sink for activation diagnostics.
pub trait ActivationLog: Send + Sync {
    /// Record one event. `fields` is merged into the entry when it is an
    /// object. Failures are swallowed; logging never affects the outcome.
    fn record(&self, event: &str, fields: Value);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopActivationLog;

impl ActivationLog for NoopActivationLog {
    fn record(&self, _event: &str, _fields: Value) {}
}

/// Appends one JSON object per line.
///
/// Each entry is written with a single `write_all` on an append-mode handle,
/// so lines from concurrent hook processes do not interleave.
pub struct JsonlActivationLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl JsonlActivationLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Mutex::new(None),
        }
    }

    /// Log at `<dir>/skill-activation.log`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_file(&self) -> Result<()> {
        let mut guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating log dir {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .with_context(|| format!("opening {}", self.path.display()))?;
            *guard = Some(file);
        }
        Ok(())
    }
}

impl ActivationLog for JsonlActivationLog {
    fn record(&self, event: &str, fields: Value) {
        if let Err(e) = self.ensure_file() {
            warn!(error = %e, "activation log unavailable");
            return;
        }

        let mut entry = serde_json::json!({
            "ts": std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            "pid": std::process::id(),
            "event": event,
        });
        if let (Some(entry), Value::Object(fields)) = (entry.as_object_mut(), fields) {
            entry.extend(fields);
        }

        let mut line = entry.to_string();
        line.push('\n');
        let mut guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref mut f) = *guard
            && let Err(e) = f.write_all(line.as_bytes())
        {
            warn!(error = %e, "failed to write activation log entry");
        }
    }
}

/// Pick the log implementation once, from the debug flag.
pub fn activation_log(enabled: bool, log_dir: &Path) -> Arc<dyn ActivationLog> {
    if enabled {
        Arc::new(JsonlActivationLog::in_dir(log_dir))
    } else {
        Arc::new(NoopActivationLog)
    }
}

/// In-memory log for assertions.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryActivationLog {
    pub(crate) entries: Mutex<Vec<(String, Value)>>,
}

#[cfg(test)]
impl MemoryActivationLog {
    pub(crate) fn events(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(event, _)| event.clone())
            .collect()
    }
}

#[cfg(test)]
impl ActivationLog for MemoryActivationLog {
    fn record(&self, event: &str, fields: Value) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((event.to_string(), fields));
    }
}
