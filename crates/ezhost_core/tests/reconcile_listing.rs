mod common;

use common::{file_record, init_logging, FakeRemote, MemoryHistory};
use ezhost_core::{Reconciler, ScanEvent, ScanPhase, Validity};
use pretty_assertions::assert_eq;

fn statuses(events: &[ScanEvent]) -> Vec<Validity> {
    events
        .iter()
        .filter_map(|event| match event {
            ScanEvent::Row(row) => Some(row.validity),
            _ => None,
        })
        .collect()
}

fn notes(events: &[ScanEvent]) -> Vec<String> {
    events.iter().filter_map(ScanEvent::note).collect()
}

#[test]
fn empty_history_completes_immediately() {
    init_logging();
    let history = MemoryHistory::default();
    let remote = FakeRemote::new();
    let mut reconciler = Reconciler::new();

    let mut scan = reconciler.list_with_status(&history, &remote).unwrap();
    assert_eq!(
        scan.next(),
        Some(ScanEvent::Complete {
            total: 0,
            valid: 0,
            invalid: 0
        })
    );
    assert_eq!(scan.phase(), ScanPhase::Done);
    assert_eq!(scan.next(), None);
    assert_eq!(remote.exists_count(), 0);
}

#[test]
fn rows_are_classified_in_insertion_order() {
    init_logging();
    let history = MemoryHistory::with(vec![
        file_record("a.png", "k1"),
        file_record("b.png", ""),
        file_record("c.png", "k2"),
    ]);
    let remote = FakeRemote::new().live("k1", true).live("k2", false);
    let mut reconciler = Reconciler::new();

    let events: Vec<_> = reconciler
        .list_with_status(&history, &remote)
        .unwrap()
        .collect();

    let urls: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ScanEvent::Row(row) => Some(row.record.primary_url.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://i.e-z.host/a.png",
            "https://i.e-z.host/b.png",
            "https://i.e-z.host/c.png"
        ]
    );
    assert_eq!(
        statuses(&events),
        vec![Validity::Valid, Validity::Invalid, Validity::Invalid]
    );
    assert_eq!(
        events.last(),
        Some(&ScanEvent::Complete {
            total: 3,
            valid: 1,
            invalid: 2
        })
    );
    // The record without a deletion reference never reached the remote.
    assert_eq!(*remote.exists_calls.borrow(), vec!["k1", "k2"]);
}

#[test]
fn progress_is_reported_every_five_rows() {
    init_logging();
    let records = (0..12).map(|i| file_record(&format!("{i}.png"), "")).collect();
    let history = MemoryHistory::with(records);
    let remote = FakeRemote::new();
    let mut reconciler = Reconciler::new();

    let events: Vec<_> = reconciler
        .list_with_status(&history, &remote)
        .unwrap()
        .collect();

    assert_eq!(
        notes(&events),
        vec!["Processing... 5/12", "Processing... 10/12", "Complete!"]
    );
    // Progress follows the fifth row directly.
    assert!(matches!(events[4], ScanEvent::Row(ref row) if row.index == 4));
    assert_eq!(
        events[5],
        ScanEvent::Progress {
            processed: 5,
            total: 12
        }
    );
}

#[test]
fn progress_cadence_is_configurable() {
    init_logging();
    let records = (0..4).map(|i| file_record(&format!("{i}.png"), "")).collect();
    let history = MemoryHistory::with(records);
    let remote = FakeRemote::new();
    let mut reconciler = Reconciler::new().with_progress_every(2);

    let events: Vec<_> = reconciler
        .list_with_status(&history, &remote)
        .unwrap()
        .collect();
    assert_eq!(
        notes(&events),
        vec!["Processing... 2/4", "Processing... 4/4", "Complete!"]
    );
}

#[test]
fn listing_twice_reuses_cached_answers() {
    init_logging();
    let history = MemoryHistory::with(vec![
        file_record("a.png", "k1"),
        file_record("b.png", "k2"),
    ]);
    let remote = FakeRemote::new().live("k1", true).check_fails("k2");
    let mut reconciler = Reconciler::new();

    let first: Vec<_> = reconciler
        .list_with_status(&history, &remote)
        .unwrap()
        .collect();
    let second: Vec<_> = reconciler
        .list_with_status(&history, &remote)
        .unwrap()
        .collect();

    assert_eq!(statuses(&first), vec![Validity::Valid, Validity::Invalid]);
    assert_eq!(statuses(&first), statuses(&second));
    assert_eq!(remote.exists_count(), 2);
    assert_eq!(reconciler.cache().len(), 2);
}

#[test]
fn scan_is_lazy_and_rewindable() {
    init_logging();
    let history = MemoryHistory::with(vec![
        file_record("a.png", "k1"),
        file_record("b.png", "k2"),
    ]);
    let remote = FakeRemote::new().live("k1", true).live("k2", true);
    let mut reconciler = Reconciler::new();

    let mut scan = reconciler.list_with_status(&history, &remote).unwrap();
    assert_eq!(remote.exists_count(), 0);

    let first = scan.next();
    assert!(matches!(first, Some(ScanEvent::Row(ref row)) if row.index == 0));
    assert_eq!(remote.exists_count(), 1);
    assert_eq!(scan.processed(), 1);

    scan.rewind();
    let replay: Vec<_> = scan.collect();
    assert_eq!(statuses(&replay), vec![Validity::Valid, Validity::Valid]);
    assert_eq!(remote.exists_count(), 2);
}

#[test]
fn deletion_url_without_key_is_invalid_without_remote_call() {
    init_logging();
    let record = file_record("a.png", "")
        .with_deletion_url("https://api.e-z.host/files/delete?token=abc");
    let history = MemoryHistory::with(vec![record]);
    let remote = FakeRemote::new();
    let mut reconciler = Reconciler::new();

    let events: Vec<_> = reconciler
        .list_with_status(&history, &remote)
        .unwrap()
        .collect();
    assert_eq!(statuses(&events), vec![Validity::Invalid]);
    assert_eq!(remote.exists_count(), 0);
}
