use anyhow::anyhow;
use drydock_core::{RestoreDisposition, RestoreOutcome, UpdateOutcome};

use crate::executor::outcome_after_restore;
use crate::status::parse_proc_uptime;

#[test]
fn full_restore_counts_as_rolled_back() {
    let (outcome, restore, error) = outcome_after_restore(Ok(RestoreOutcome::Full));
    assert_eq!(outcome, UpdateOutcome::RolledBack);
    assert_eq!(restore, RestoreDisposition::Restored);
    assert!(error.is_none());
}

#[test]
fn partial_restore_stays_failed_and_keeps_the_reason() {
    let (outcome, restore, error) = outcome_after_restore(Ok(RestoreOutcome::Partial {
        db_error: "partial-restore: database reload failed".to_string(),
    }));
    assert_eq!(outcome, UpdateOutcome::Failed);
    assert_eq!(restore, RestoreDisposition::Partial);
    assert!(error
        .expect("reason should be carried")
        .contains("partial-restore"));
}

#[test]
fn failed_restore_is_reported_distinctly() {
    let (outcome, restore, error) =
        outcome_after_restore(Err(anyhow!("restore-failed(files): gone")));
    assert_eq!(outcome, UpdateOutcome::Failed);
    assert_eq!(restore, RestoreDisposition::Failed);
    assert!(error
        .expect("reason should be carried")
        .contains("restore-failed"));
}

#[test]
fn proc_uptime_parses_whole_seconds() {
    assert_eq!(parse_proc_uptime("12345.67 98765.43\n"), Some(12_345));
    assert_eq!(parse_proc_uptime("0.00 0.00\n"), Some(0));
    assert_eq!(parse_proc_uptime(""), None);
    assert_eq!(parse_proc_uptime("not-a-number 1.0"), None);
}
