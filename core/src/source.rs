//! Record sources — the seam standing in for the data warehouse.
//!
//! The core never talks to the warehouse; it consumes whatever a
//! RecordSource yields. Caching is explicit: CachedSource memoizes
//! one snapshot until the caller invalidates it with refresh(). The
//! core has no notion of staleness, so nothing expires on its own.

use crate::record::WorkOrderRecord;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Anything that can produce the raw extract. One-shot, blocking,
/// called before the simulation starts.
pub trait RecordSource {
    fn fetch(&mut self) -> anyhow::Result<Vec<WorkOrderRecord>>;
}

/// Reads a JSON array of WorkOrderRecord from disk. The runner's
/// concrete source; stands in for the warehouse extract.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&mut self) -> anyhow::Result<Vec<WorkOrderRecord>> {
        let path = self.path.display();
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let records: Vec<WorkOrderRecord> = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Malformed record extract {path}: {e}"))?;
        log::info!("{} work order records loaded from {path}", records.len());
        Ok(records)
    }
}

/// Memoizes the inner source's last fetch. Invalidation is the
/// caller's call — refresh() drops the snapshot, nothing else does.
pub struct CachedSource<S: RecordSource> {
    inner: S,
    snapshot: Option<Vec<WorkOrderRecord>>,
    fetched_at: Option<DateTime<Utc>>,
}

impl<S: RecordSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            snapshot: None,
            fetched_at: None,
        }
    }

    /// When the cached snapshot was taken. None before the first
    /// fetch or after a refresh.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Drop the cached snapshot; the next fetch hits the inner source.
    pub fn refresh(&mut self) {
        self.snapshot = None;
        self.fetched_at = None;
    }
}

impl<S: RecordSource> RecordSource for CachedSource<S> {
    fn fetch(&mut self) -> anyhow::Result<Vec<WorkOrderRecord>> {
        if let Some(snapshot) = &self.snapshot {
            return Ok(snapshot.clone());
        }
        let records = self.inner.fetch()?;
        self.fetched_at = Some(Utc::now());
        self.snapshot = Some(records.clone());
        Ok(records)
    }
}
