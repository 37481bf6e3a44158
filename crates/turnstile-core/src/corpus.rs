//! The selection corpus — an ordered, immutable list of content records.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::date_key::DateKey;
use crate::error::SelectionError;
use crate::selector;
use crate::types::ContentRecord;

/// Read-only corpus shared across request handlers.
///
/// Cloning is cheap (`Arc`); the records never change after loading.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Arc<[ContentRecord]>,
}

impl Corpus {
    pub fn from_records(records: Vec<ContentRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Load a JSON array of records.
    ///
    /// An empty array loads fine; selection against it fails later with
    /// [`SelectionError::EmptyCorpus`].
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)?;
        let records: Vec<ContentRecord> = serde_json::from_slice(&bytes)?;
        debug!(?path, count = records.len(), "corpus loaded");
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// The record for a calendar date.
    pub fn daily(&self, date: &DateKey) -> Result<&ContentRecord, SelectionError> {
        let idx = selector::index(date.as_str(), self.records.len())?;
        Ok(&self.records[idx])
    }

    /// Exact match on the reference label.
    pub fn by_ref(&self, ref_key: &str) -> Result<&ContentRecord, SelectionError> {
        self.ensure_not_empty()?;
        self.records
            .iter()
            .find(|r| r.ref_key == ref_key)
            .ok_or_else(|| SelectionError::NotFound(format!("reference {ref_key}")))
    }

    /// Match on book (case-insensitive), chapter and verse.
    pub fn by_reference(
        &self,
        book: &str,
        chapter: u32,
        verse: u32,
    ) -> Result<&ContentRecord, SelectionError> {
        self.ensure_not_empty()?;
        self.records
            .iter()
            .find(|r| r.chapter == chapter && r.verse == verse && r.book.eq_ignore_ascii_case(book))
            .ok_or_else(|| SelectionError::NotFound(format!("{book} {chapter}:{verse}")))
    }

    fn ensure_not_empty(&self) -> Result<(), SelectionError> {
        if self.records.is_empty() {
            return Err(SelectionError::EmptyCorpus);
        }
        Ok(())
    }
}
