//! Static fallback dataset.
//!
//! # Responsibilities
//! - Load the bundled product list once at startup
//! - Serve lookups by id and the full ordered list
//!
//! # Design Decisions
//! - Load failure is non-fatal: the dataset is empty and every lookup misses
//! - Lookup is a linear scan; the dataset is small
//! - Immutable after load; shared via Arc

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::fallback::product::Product;

/// Immutable list of products substituted for live data in degraded mode.
#[derive(Debug, Clone, Default)]
pub struct FallbackDataset {
    records: Vec<Product>,
}

impl FallbackDataset {
    /// An empty dataset. Every lookup returns nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Product>) -> Self {
        Self { records }
    }

    /// Load a JSON array of products from `path`.
    ///
    /// Never fails: unreadable or unparsable files yield an empty dataset,
    /// and individual entries without a usable id are skipped.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read fallback dataset");
                return Self::empty();
            }
        };

        match Self::parse(&content) {
            Ok(dataset) => {
                tracing::info!(
                    path = %path.display(),
                    records = dataset.len(),
                    "Fallback dataset loaded"
                );
                dataset
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to parse fallback dataset");
                Self::empty()
            }
        }
    }

    /// Parse dataset content. Only a non-array document is an error.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<Value> = serde_json::from_str(content)?;
        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match Product::try_from(entry) {
                Ok(product) => records.push(product),
                Err(e) => tracing::warn!(index, error = %e, "Skipping invalid fallback record"),
            }
        }
        Ok(Self { records })
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.records.iter().find(|p| p.id == id)
    }

    /// All records in load order.
    pub fn all(&self) -> &[Product] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
