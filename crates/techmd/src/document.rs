//! Technical-metadata document and per-file records

use crate::{Result, TechmdError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document shape marker; transitional legacy documents predate it
pub const TECHMD_VERSION: u32 = 2;

/// Variant detected when reading a raw document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentVariant {
    Current,
    /// Legacy shape that must be upgraded before merging
    Transitional,
}

/// Derived technical properties for one file
///
/// `properties` is opaque here: format, dimensions, checksums and whatever
/// else the characterization collaborator derived. `path` is the record's
/// self-identifying field and is rewritten when a record is cloned onto
/// another path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub properties: Value,
}

impl FileRecord {
    /// Clone this record onto another path
    pub fn cloned_as(&self, path: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            properties: self.properties.clone(),
        }
    }
}

/// Root document: object id, generation time, per-file records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechDocument {
    pub techmd_version: u32,
    pub object_id: String,
    pub datetime: DateTime<Utc>,
    pub files: Vec<FileRecord>,
}

impl TechDocument {
    /// Create a document; records are kept sorted by path
    pub fn new(object_id: &str, datetime: DateTime<Utc>, mut files: Vec<FileRecord>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            techmd_version: TECHMD_VERSION,
            object_id: object_id.to_string(),
            datetime,
            files,
        }
    }

    /// Look up the record for a path
    pub fn record_for(&self, path: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Serialize to JSON with records sorted by path
    ///
    /// Sorting keeps the output byte-stable regardless of how the input maps
    /// iterated.
    pub fn to_json(&self) -> Result<String> {
        let mut doc = self.clone();
        doc.files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Parse a current-variant document
    ///
    /// Transitional documents are refused; route them through
    /// [`read_document`] with an upgrade collaborator instead.
    pub fn from_json(raw: &str) -> Result<Self> {
        if detect_variant(raw)? == DocumentVariant::Transitional {
            return Err(TechmdError::TransitionalDocument);
        }
        Ok(serde_json::from_str(raw)?)
    }
}

/// Detect whether a raw document is current or transitional
pub fn detect_variant(raw: &str) -> Result<DocumentVariant> {
    let value: Value = serde_json::from_str(raw)?;
    match value.get("techmdVersion") {
        Some(_) => Ok(DocumentVariant::Current),
        None => Ok(DocumentVariant::Transitional),
    }
}

/// External collaborator that rewrites a transitional document into the
/// current shape
pub trait LegacyUpgrade {
    fn upgrade(&self, raw: &str) -> anyhow::Result<TechDocument>;
}

/// Read a raw document, upgrading the transitional variant through the
/// injected collaborator
pub fn read_document(raw: &str, upgrader: &dyn LegacyUpgrade) -> Result<TechDocument> {
    match detect_variant(raw)? {
        DocumentVariant::Current => TechDocument::from_json(raw),
        DocumentVariant::Transitional => {
            tracing::debug!("Upgrading transitional technical-metadata document");
            upgrader.upgrade(raw).map_err(TechmdError::Upgrade)
        }
    }
}
