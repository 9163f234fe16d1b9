use crate::error::{ReportError, Result};
use crate::export::write_csv;
use crate::ingestion::parse_csv;
use crate::normalizer::normalize_dates;
use crate::schema::{Dataset, HistoryEntry, ReportConfig};
use chrono::{Local, NaiveDateTime, Timelike};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// What an upload did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No bytes were supplied; nothing changed
    NoInput,
    /// The upload became the current dataset and was added to the history
    Loaded { rows: usize },
    /// A dataset is already loaded and re-upload is disabled; nothing changed
    Ignored,
}

/// State of one user's session: every accepted upload, oldest first. The
/// loaded dataset is the table of the latest one.
///
/// Created empty, owned by the caller, dropped at the end of the session.
/// Nothing is persisted.
#[derive(Debug, Default)]
pub struct Session {
    config: ReportConfig,
    history: Vec<HistoryEntry>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReportConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// The loaded dataset, if any upload has been accepted.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.history.last().map(HistoryEntry::dataset)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Ingests an upload stamped with the current local time.
    pub fn ingest(&mut self, bytes: &[u8], filename: &str) -> Result<IngestOutcome> {
        self.ingest_at(bytes, filename, Local::now().naive_local())
    }

    /// Ingests an upload stamped with `uploaded_at`.
    ///
    /// The timestamp is truncated to whole seconds and never goes backwards:
    /// a value earlier than the last history entry's is raised to it.
    ///
    /// Once a dataset is loaded, further uploads are ignored unless the
    /// config allows re-upload. A parse failure leaves the session untouched.
    pub fn ingest_at(
        &mut self,
        bytes: &[u8],
        filename: &str,
        uploaded_at: NaiveDateTime,
    ) -> Result<IngestOutcome> {
        if bytes.is_empty() {
            return Ok(IngestOutcome::NoInput);
        }

        if !self.history.is_empty() && !self.config.allow_reupload {
            warn!("Ignoring upload '{}': a dataset is already loaded", filename);
            return Ok(IngestOutcome::Ignored);
        }

        let dataset = parse_csv(bytes, filename)?;

        let mut uploaded_at = uploaded_at.with_nanosecond(0).unwrap_or(uploaded_at);
        if let Some(last) = self.history.last() {
            uploaded_at = uploaded_at.max(last.uploaded_at());
        }

        let rows = dataset.len();
        let columns = dataset.columns().len();
        let entry = HistoryEntry::new(uploaded_at, filename.to_string(), dataset);
        info!(
            "Loaded '{}' ({} rows, {} columns) at {}",
            filename,
            rows,
            columns,
            entry.timestamp()
        );
        self.history.push(entry);

        Ok(IngestOutcome::Loaded { rows })
    }

    /// Runs the date normalizer over the loaded dataset.
    ///
    /// Returns `false` when nothing is loaded or there is no date column.
    pub fn normalize_dates(&mut self) -> Result<bool> {
        match self.history.last_mut() {
            Some(entry) => normalize_dates(entry.dataset_mut(), &self.config),
            None => Ok(false),
        }
    }

    /// Writes history entry `index` as `<export_prefix><filename>` inside
    /// `dir` and returns the written path.
    ///
    /// Only the last component of the uploaded filename is used, so the file
    /// always lands directly in `dir`.
    pub fn export_history_entry(&self, index: usize, dir: &Path) -> Result<PathBuf> {
        let entry = self
            .history
            .get(index)
            .ok_or(ReportError::HistoryEntryNotFound(index))?;

        let name = Path::new(entry.filename())
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let path = dir.join(format!("{}{}", self.config.export_prefix, name));
        write_csv(entry.dataset(), &path)?;

        info!("Exported '{}' to {}", entry.filename(), path.display());
        Ok(path)
    }
}
