//! Flat-file encoding of a timestamp collection
//!
//! One decimal timestamp per line, newline-terminated, no header. Blank lines
//! are ignored on read. A missing file reads as an empty collection.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, warn};

use super::Timestamp;
use super::error::{PersistenceError, Result};

/// What to do with a line that does not parse as an integer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLines {
    /// Abort the whole read with `PersistenceError::Parse`
    #[default]
    Fail,
    /// Drop the line and log a warning
    Skip,
}

/// Stateless translation between a path and a list of timestamps
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn read_all(&self, path: &Path) -> Result<Vec<Timestamp>>;

    async fn append(&self, path: &Path, timestamp: Timestamp) -> Result<()>;

    /// Replace the file contents with `timestamps`, creating it if needed
    async fn rewrite(&self, path: &Path, timestamps: &[Timestamp]) -> Result<()>;

    async fn file_exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilePersistence {
    malformed: MalformedLines,
}

impl FilePersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_malformed_lines(mut self, policy: MalformedLines) -> Self {
        self.malformed = policy;
        self
    }

    async fn write_to_file(&self, path: &Path, timestamps: &[Timestamp], append: bool) -> Result<()> {
        let mut options = OpenOptions::new();
        options.create(true).write(true);
        if append {
            options.append(true);
        } else {
            options.truncate(true);
        }

        let file = options
            .open(path)
            .await
            .map_err(|e| PersistenceError::io(path, e))?;

        let mut writer = BufWriter::new(file);
        for timestamp in timestamps {
            writer
                .write_all(format!("{timestamp}\n").as_bytes())
                .await
                .map_err(|e| PersistenceError::io(path, e))?;
        }

        writer.flush().await.map_err(|e| PersistenceError::io(path, e))?;
        writer
            .get_ref()
            .sync_data()
            .await
            .map_err(|e| PersistenceError::io(path, e))?;

        Ok(())
    }
}

#[async_trait]
impl Persistence for FilePersistence {
    async fn read_all(&self, path: &Path) -> Result<Vec<Timestamp>> {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No timestamp file, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(PersistenceError::io(path, e)),
        };

        let mut timestamps = Vec::new();
        let mut lines = BufReader::new(file).lines();
        let mut line_number = 0;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| PersistenceError::io(path, e))?
        {
            line_number += 1;
            let content = line.trim();
            if content.is_empty() {
                continue;
            }

            match content.parse::<Timestamp>() {
                Ok(timestamp) => timestamps.push(timestamp),
                Err(source) => match self.malformed {
                    MalformedLines::Fail => {
                        return Err(PersistenceError::Parse {
                            path: path.to_path_buf(),
                            line: line_number,
                            content: content.to_string(),
                            source,
                        });
                    }
                    MalformedLines::Skip => {
                        warn!(
                            path = %path.display(),
                            line = line_number,
                            content,
                            "Skipping malformed timestamp"
                        );
                    }
                },
            }
        }

        Ok(timestamps)
    }

    async fn append(&self, path: &Path, timestamp: Timestamp) -> Result<()> {
        self.write_to_file(path, &[timestamp], true).await
    }

    async fn rewrite(&self, path: &Path, timestamps: &[Timestamp]) -> Result<()> {
        self.write_to_file(path, timestamps, false).await
    }

    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}
