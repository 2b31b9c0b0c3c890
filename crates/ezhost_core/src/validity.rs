use std::collections::HashMap;

use ezhost_logging::{ezhost_debug, ezhost_warn};

use crate::{redact_reference, EzHostError};

/// Process-lifetime memo of liveness checks, keyed by deletion reference.
///
/// Entries are never evicted: a reference checked once keeps its answer for
/// the rest of the run even if the remote state changes.
#[derive(Debug, Default)]
pub struct ValidityCache {
    entries: HashMap<String, bool>,
}

impl ValidityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized answer, running `query` only on a miss.
    ///
    /// A failed query is stored as `false`. An empty reference is invalid and
    /// never reaches `query` or the cache.
    pub fn is_valid<F>(&mut self, deletion_reference: &str, query: F) -> bool
    where
        F: FnOnce(&str) -> Result<bool, EzHostError>,
    {
        if deletion_reference.trim().is_empty() {
            return false;
        }
        if let Some(&cached) = self.entries.get(deletion_reference) {
            return cached;
        }

        let live = match query(deletion_reference) {
            Ok(live) => live,
            Err(err) => {
                ezhost_warn!(
                    "Liveness check failed for {}: {}",
                    redact_reference(deletion_reference),
                    err
                );
                false
            }
        };
        ezhost_debug!(
            "Cached liveness {} for {}",
            live,
            redact_reference(deletion_reference)
        );
        self.entries.insert(deletion_reference.to_string(), live);
        live
    }

    pub fn cached(&self, deletion_reference: &str) -> Option<bool> {
        self.entries.get(deletion_reference).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
