//! Temporary-file backing for structured-output schemas.
//!
//! The CLI takes an output schema as a file path. When a caller supplies a
//! schema value, it is written to `schema.json` inside a fresh uniquely
//! named temporary directory; the directory and file are removed when the
//! turn ends, regardless of how it ends.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use crate::{Error, Result};

/// A schema materialized on disk for the lifetime of one turn.
///
/// Deletion is guaranteed: dropping the handle removes the backing
/// directory, so any exit path — success, failure, cancellation, or a
/// panic while the turn is polled — releases the resource.
#[derive(Debug)]
pub struct OutputSchemaFile {
    dir: Option<TempDir>,
    path: Option<PathBuf>,
}

impl OutputSchemaFile {
    /// Materialize a schema, if one was supplied.
    ///
    /// `None` yields an inert handle with no path. A value that is not a
    /// JSON object fails with [`Error::InvalidSchema`] before anything is
    /// written to disk.
    pub async fn create(schema: Option<&Value>) -> Result<Self> {
        let Some(schema) = schema else {
            return Ok(Self {
                dir: None,
                path: None,
            });
        };
        if !schema.is_object() {
            return Err(Error::InvalidSchema(
                "output schema must be a JSON object".into(),
            ));
        }

        let dir = tempfile::Builder::new()
            .prefix("codex-output-schema-")
            .tempdir()
            .map_err(Error::io)?;
        let path = dir.path().join("schema.json");
        let bytes = serde_json::to_vec(schema)
            .map_err(|err| Error::InvalidSchema(format!("schema not serializable: {err}")))?;
        tokio::fs::write(&path, bytes).await.map_err(Error::io)?;

        Ok(Self {
            dir: Some(dir),
            path: Some(path),
        })
    }

    /// Path to the schema file, if a schema was materialized.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Remove the backing directory now instead of at drop time.
    ///
    /// Removal failures are logged, never surfaced: cleanup must not mask
    /// whatever error ended the turn.
    pub fn cleanup(mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(err) = dir.close() {
                tracing::warn!("failed to remove output schema dir: {err}");
            }
        }
    }
}
