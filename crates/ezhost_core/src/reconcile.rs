//! History reconciliation: classify every record as live or dead, list the
//! results progressively, and purge live artifacts without losing records
//! whose remote deletion was not confirmed.
use std::fmt;

use ezhost_logging::{ezhost_debug, ezhost_info, ezhost_warn};

use crate::{ArtifactRecord, ArtifactRemote, EzHostError, HistoryRepository, ValidityCache};

/// Literal the caller must pass to [`Reconciler::purge`].
pub const CONFIRMATION_TOKEN: &str = "CONFIRM";

/// Rows between two progress events while listing.
pub const DEFAULT_PROGRESS_EVERY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self == Validity::Valid
    }

    pub fn label(self) -> &'static str {
        match self {
            Validity::Valid => "Valid",
            Validity::Invalid => "Invalid/Expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    /// Position in the history snapshot.
    pub index: usize,
    pub record: ArtifactRecord,
    pub validity: Validity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Row(StatusRow),
    Progress { processed: usize, total: usize },
    Complete { total: usize, valid: usize, invalid: usize },
}

impl ScanEvent {
    /// Status text for progress and completion; rows carry none.
    pub fn note(&self) -> Option<String> {
        match self {
            ScanEvent::Row(_) => None,
            ScanEvent::Progress { processed, total } => {
                Some(format!("Processing... {processed}/{total}"))
            }
            ScanEvent::Complete { .. } => Some("Complete!".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Scanning,
    Done,
}

/// Counts returned by a confirmed purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeReport {
    pub initial: usize,
    pub deleted: usize,
    pub failed: usize,
    pub remaining: usize,
}

impl fmt::Display for PurgeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Purge completed:")?;
        writeln!(f, "- Initial items: {}", self.initial)?;
        writeln!(f, "- Successfully deleted: {}", self.deleted)?;
        writeln!(f, "- Failed to delete: {}", self.failed)?;
        write!(f, "- Remaining items: {}", self.remaining)
    }
}

/// Drives listing and purging for one process run.
///
/// Owns the [`ValidityCache`], so every scan and purge issued through the
/// same reconciler shares liveness answers.
#[derive(Debug)]
pub struct Reconciler {
    cache: ValidityCache,
    progress_every: usize,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            cache: ValidityCache::new(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every.max(1);
        self
    }

    pub fn cache(&self) -> &ValidityCache {
        &self.cache
    }

    pub fn classify(&mut self, record: &ArtifactRecord, remote: &dyn ArtifactRemote) -> Validity {
        classify_with(&mut self.cache, record, remote)
    }

    /// Lazily classifies a snapshot of the history, in insertion order.
    pub fn list_with_status<'a>(
        &'a mut self,
        history: &dyn HistoryRepository,
        remote: &'a dyn ArtifactRemote,
    ) -> Result<StatusScan<'a>, EzHostError> {
        let records = history.load()?;
        ezhost_debug!("Listing {} history records", records.len());
        Ok(StatusScan {
            cache: &mut self.cache,
            remote,
            records,
            progress_every: self.progress_every,
            next_index: 0,
            valid: 0,
            progress_pending: false,
            phase: ScanPhase::Scanning,
        })
    }

    /// Deletes every live artifact and drops it from history.
    ///
    /// A record is only dropped when the remote confirms the deletion; the
    /// surviving set is written back with a single `replace`.
    pub fn purge(
        &mut self,
        confirmation: &str,
        history: &dyn HistoryRepository,
        remote: &dyn ArtifactRemote,
    ) -> Result<PurgeReport, EzHostError> {
        if confirmation != CONFIRMATION_TOKEN {
            ezhost_warn!("Purge refused: confirmation token did not match");
            return Err(EzHostError::NotConfirmed);
        }

        let records = history.load()?;
        let initial = records.len();
        let mut survivors = Vec::with_capacity(initial);
        let mut deleted = 0;
        let mut failed = 0;

        for record in records {
            if classify_with(&mut self.cache, &record, remote).is_valid() {
                if let Some(reference) = record.deletion_reference() {
                    match remote.delete_by_reference(reference) {
                        Ok(outcome) if outcome.success => {
                            ezhost_info!("Deleted {} {}", record.kind, record.primary_url);
                            deleted += 1;
                            continue;
                        }
                        Ok(outcome) => {
                            ezhost_warn!(
                                "Delete refused for {}: {}",
                                record.primary_url,
                                outcome.message.as_deref().unwrap_or("no message")
                            );
                            failed += 1;
                        }
                        Err(err) => {
                            ezhost_warn!("Delete failed for {}: {}", record.primary_url, err);
                            failed += 1;
                        }
                    }
                }
            }
            survivors.push(record);
        }

        history.replace(&survivors)?;
        let report = PurgeReport {
            initial,
            deleted,
            failed,
            remaining: survivors.len(),
        };
        ezhost_info!(
            "Purge finished: initial={} deleted={} failed={} remaining={}",
            report.initial,
            report.deleted,
            report.failed,
            report.remaining
        );
        Ok(report)
    }
}

fn classify_with(
    cache: &mut ValidityCache,
    record: &ArtifactRecord,
    remote: &dyn ArtifactRemote,
) -> Validity {
    let Some(reference) = record.deletion_reference() else {
        return Validity::Invalid;
    };
    let live = cache.is_valid(reference, |reference| match crate::deletion_key(reference) {
        Some(key) => remote.check_exists(&key),
        None => Ok(false),
    });
    if live {
        Validity::Valid
    } else {
        Validity::Invalid
    }
}

/// Resumable iteration over one history snapshot.
///
/// Yields a [`ScanEvent::Row`] per record, a [`ScanEvent::Progress`] after every
/// `progress_every` rows and a single [`ScanEvent::Complete`] at the end.
/// Each record is classified only when its row is pulled.
pub struct StatusScan<'a> {
    cache: &'a mut ValidityCache,
    remote: &'a dyn ArtifactRemote,
    records: Vec<ArtifactRecord>,
    progress_every: usize,
    next_index: usize,
    valid: usize,
    progress_pending: bool,
    phase: ScanPhase,
}

impl StatusScan<'_> {
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn processed(&self) -> usize {
        self.next_index
    }

    /// Starts over on the same snapshot; cached answers are reused.
    pub fn rewind(&mut self) {
        self.next_index = 0;
        self.valid = 0;
        self.progress_pending = false;
        self.phase = ScanPhase::Scanning;
    }
}

impl Iterator for StatusScan<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        if self.phase == ScanPhase::Done {
            return None;
        }
        let total = self.records.len();

        if self.progress_pending {
            self.progress_pending = false;
            return Some(ScanEvent::Progress {
                processed: self.next_index,
                total,
            });
        }

        if let Some(record) = self.records.get(self.next_index) {
            let validity = classify_with(self.cache, record, self.remote);
            let row = StatusRow {
                index: self.next_index,
                record: record.clone(),
                validity,
            };
            self.next_index += 1;
            if validity.is_valid() {
                self.valid += 1;
            }
            if self.next_index % self.progress_every == 0 {
                self.progress_pending = true;
            }
            return Some(ScanEvent::Row(row));
        }

        self.phase = ScanPhase::Done;
        Some(ScanEvent::Complete {
            total,
            valid: self.valid,
            invalid: total - self.valid,
        })
    }
}
