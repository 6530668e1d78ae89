//! Audit storage backends.

use crate::error::AuditError;
use crate::event::AuditEvent;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Trait for audit storage backends.
pub trait AuditStorage: Send + Sync {
    /// Append one event. Implementations must not rewrite earlier events.
    fn append(&self, event: &AuditEvent) -> Result<(), AuditError>;

    /// Read every stored event, oldest first.
    fn read_all(&self) -> Result<Vec<AuditEvent>, AuditError>;
}

/// No-op storage used when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullStorage;

impl NullStorage {
    pub fn new() -> Self {
        Self
    }
}

impl AuditStorage for NullStorage {
    fn append(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(Vec::new())
    }
}

/// NDJSON file storage (one event per line, append-only).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a file storage writing to `path`. The file is created on first
    /// append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_failed(&self, source: std::io::Error) -> AuditError {
        AuditError::AppendFailed {
            path: self.path.clone(),
            source,
        }
    }
}

impl AuditStorage for FileStorage {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.append_failed(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.append_failed(e))?;

        // Single write so the line lands in one piece under O_APPEND.
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| self.append_failed(e))?;

        Ok(())
    }

    fn read_all(&self) -> Result<Vec<AuditEvent>, AuditError> {
        let read_failed = |source: std::io::Error| AuditError::ReadFailed {
            path: self.path.clone(),
            source,
        };

        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_failed(e)),
        };

        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(read_failed)?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<AuditEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!(
                        "Skipping unparseable audit event on line {} of {}: {}",
                        line_num + 1,
                        self.path.display(),
                        e
                    );
                }
            }
        }

        Ok(events)
    }
}
