//! Result sinks: persisting scored batches and finished reviews.
//!
//! Final results are append-only across runs: every persisted review gets a
//! new timestamped file and an existing file is never overwritten.
//!
//! ```text
//! results/
//! ├── scored_latest.csv                  # Latest scored batch (replaced per batch)
//! ├── final_results_20250114_093012.csv  # One file per finished review
//! └── final_results_20250114_093012_1.csv
//! ```

mod table;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{ApprovalError, Result};
use crate::queue::{DecisionQueue, Item};

pub use table::{MergedRecord, OutputFormat};

/// Highest `_n` suffix tried before giving up on a unique file name.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Destination for a finished review.
pub trait ResultSink {
    /// Persist the merged results of a terminal queue, returning where they went.
    fn persist(&self, queue: &DecisionQueue) -> Result<PathBuf>;
}

/// Writes each finished review to a new timestamped file in a directory.
#[derive(Debug, Clone)]
pub struct FileResultSink {
    dir: PathBuf,
    format: OutputFormat,
    prefix: String,
}

impl FileResultSink {
    /// Create a CSV sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: OutputFormat::Csv,
            prefix: "final_results".to_string(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(&self, stamp: &str, attempt: usize) -> String {
        if attempt == 0 {
            format!("{}_{}.{}", self.prefix, stamp, self.format.extension())
        } else {
            format!(
                "{}_{}_{}.{}",
                self.prefix,
                stamp,
                attempt,
                self.format.extension()
            )
        }
    }

    /// Write a new file named `<prefix>_<stamp>[_n].<ext>`.
    ///
    /// Content goes to a temp file in the same directory and only appears
    /// under a result name once fully written. Existing files are never
    /// replaced, and a failed write leaves nothing behind.
    fn write_unique<F>(&self, stamp: &str, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        fs::create_dir_all(&self.dir).map_err(|e| ApprovalError::io(&self.dir, e))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| ApprovalError::io(&self.dir, e))?;
        let tmp_path = tmp.path().to_path_buf();
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            write(&mut writer)?;
            writer.flush().map_err(|e| ApprovalError::io(&tmp_path, e))?;
        }

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(self.file_name(stamp, attempt));
            match tmp.persist_noclobber(&path) {
                Ok(_) => return Ok(path),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
                Err(e) => return Err(ApprovalError::io(&path, e.error)),
            }
        }

        Err(ApprovalError::Persistence(format!(
            "No free result file name for stamp {} in '{}'",
            stamp,
            self.dir.display()
        )))
    }
}

impl ResultSink for FileResultSink {
    fn persist(&self, queue: &DecisionQueue) -> Result<PathBuf> {
        let merged = queue.merged_results()?;
        let records: Vec<MergedRecord<'_>> = merged
            .iter()
            .map(|(item, decision)| MergedRecord::new(item, decision))
            .collect();

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = self.write_unique(&stamp, |writer| {
            table::write_merged(writer, &records, self.format)
        })?;

        info!(path = %path.display(), rows = records.len(), "persisted review results");
        Ok(path)
    }
}

/// Write the scored batch table, replacing any previous export at `path`.
pub fn write_scored(path: impl AsRef<Path>, items: &[Item]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ApprovalError::io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| ApprovalError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    table::write_scored(&mut writer, items)?;
    writer.flush().map_err(|e| ApprovalError::io(path, e))?;

    info!(path = %path.display(), rows = items.len(), "exported scored batch");
    Ok(())
}
