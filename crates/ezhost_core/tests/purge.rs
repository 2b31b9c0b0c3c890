mod common;

use common::{file_record, init_logging, DeleteBehaviour, FakeRemote, MemoryHistory};
use ezhost_core::{EzHostError, PurgeReport, Reconciler};
use pretty_assertions::assert_eq;

#[test]
fn purge_requires_exact_confirmation() {
    init_logging();
    let history = MemoryHistory::with(vec![file_record("a.png", "k1")]);
    let remote = FakeRemote::new()
        .live("k1", true)
        .on_delete("k1", DeleteBehaviour::Succeed);
    let mut reconciler = Reconciler::new();

    for token in ["confirm", "", "CONFIRM ", "Confirm"] {
        let err = reconciler.purge(token, &history, &remote).unwrap_err();
        assert_eq!(err, EzHostError::NotConfirmed);
    }

    assert_eq!(history.replace_calls.get(), 0);
    assert_eq!(history.snapshot().len(), 1);
    assert!(remote.delete_calls.borrow().is_empty());
    assert_eq!(remote.exists_count(), 0);
}

#[test]
fn purge_removes_only_confirmed_deletions() {
    init_logging();
    let a = file_record("a.png", "k1");
    let b = file_record("b.png", "");
    let c = file_record("c.png", "k2");
    let history = MemoryHistory::with(vec![a, b.clone(), c.clone()]);
    let remote = FakeRemote::new()
        .live("k1", true)
        .on_delete("k1", DeleteBehaviour::Succeed)
        .live("k2", false);
    let mut reconciler = Reconciler::new();

    let report = reconciler.purge("CONFIRM", &history, &remote).unwrap();

    assert_eq!(
        report,
        PurgeReport {
            initial: 3,
            deleted: 1,
            failed: 0,
            remaining: 2
        }
    );
    assert_eq!(history.snapshot(), vec![b, c]);
    assert_eq!(history.replace_calls.get(), 1);
    assert_eq!(remote.delete_calls.borrow().len(), 1);
}

#[test]
fn failed_or_refused_deletes_are_retained() {
    init_logging();
    let refused = file_record("refused.png", "k1");
    let broken = file_record("broken.png", "k2");
    let gone = file_record("gone.png", "k3");
    let history = MemoryHistory::with(vec![refused.clone(), broken.clone(), gone]);
    let remote = FakeRemote::new()
        .live("k1", true)
        .on_delete("k1", DeleteBehaviour::Refuse)
        .live("k2", true)
        .on_delete("k2", DeleteBehaviour::Fail)
        .live("k3", true)
        .on_delete("k3", DeleteBehaviour::Succeed);
    let mut reconciler = Reconciler::new();

    let report = reconciler.purge("CONFIRM", &history, &remote).unwrap();

    assert_eq!(report.deleted, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(report.remaining, 2);
    assert_eq!(history.snapshot(), vec![refused, broken]);
}

#[test]
fn failed_liveness_check_keeps_record_without_delete() {
    init_logging();
    let record = file_record("a.png", "k1");
    let history = MemoryHistory::with(vec![record.clone()]);
    let remote = FakeRemote::new().check_fails("k1");
    let mut reconciler = Reconciler::new();

    let report = reconciler.purge("CONFIRM", &history, &remote).unwrap();

    assert_eq!(report.failed, 0);
    assert_eq!(report.remaining, 1);
    assert!(remote.delete_calls.borrow().is_empty());
    assert_eq!(history.snapshot(), vec![record]);
}

#[test]
fn empty_history_still_writes_once() {
    init_logging();
    let history = MemoryHistory::default();
    let remote = FakeRemote::new();
    let mut reconciler = Reconciler::new();

    let report = reconciler.purge("CONFIRM", &history, &remote).unwrap();
    assert_eq!(report, PurgeReport::default());
    assert_eq!(history.replace_calls.get(), 1);
}

#[test]
fn replace_failure_is_reported() {
    init_logging();
    let history = MemoryHistory {
        fail_replace: true,
        ..MemoryHistory::with(vec![file_record("a.png", "k1")])
    };
    let remote = FakeRemote::new()
        .live("k1", true)
        .on_delete("k1", DeleteBehaviour::Succeed);
    let mut reconciler = Reconciler::new();

    let err = reconciler.purge("CONFIRM", &history, &remote).unwrap_err();
    assert!(matches!(err, EzHostError::Persistence(_)));
}

#[test]
fn report_renders_all_counts() {
    let report = PurgeReport {
        initial: 4,
        deleted: 2,
        failed: 1,
        remaining: 2,
    };
    assert_eq!(
        report.to_string(),
        "Purge completed:\n- Initial items: 4\n- Successfully deleted: 2\n- Failed to delete: 1\n- Remaining items: 2"
    );
}
