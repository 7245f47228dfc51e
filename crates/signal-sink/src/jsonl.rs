use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::api::SignalSink;
use crate::errors::SinkError;
use crate::model::Signal;

/// Newline-delimited JSON log, one signal per line, opened in append mode.
pub struct JsonlSignalSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlSignalSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SignalSink for JsonlSignalSink {
    fn append(&self, signal: Signal) -> Result<(), SinkError> {
        // Encode outside the lock; the write itself is one call per record.
        let mut line = serde_json::to_vec(&signal)?;
        line.push(b'\n');
        let mut file = self.file.lock();
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.file.lock().sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SignalType;
    use serde_json::json;

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/signals.jsonl");
        let sink = JsonlSignalSink::open(&path).unwrap();
        sink.append(Signal::new(
            SignalType::SelectorOutcome,
            "navigation",
            "test",
            json!({"outcome": "found"}),
        ))
        .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 1);
        assert!(raw.ends_with('\n'));
    }
}
