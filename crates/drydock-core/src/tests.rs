use std::fs;
use std::path::PathBuf;

use crate::{
    current_unix_timestamp, mint_run_id, SiteLayout, UpdateConfig, UpdateLock, UpdateOutcome,
    UpdateStep,
};

#[test]
fn outcome_round_trips_through_as_str() {
    for outcome in [
        UpdateOutcome::Running,
        UpdateOutcome::Succeeded,
        UpdateOutcome::Failed,
        UpdateOutcome::RolledBack,
    ] {
        let parsed = UpdateOutcome::parse(outcome.as_str()).expect("must parse");
        assert_eq!(parsed, outcome);
    }
    assert!(UpdateOutcome::parse("exploded").is_err());
}

#[test]
fn only_running_is_non_terminal() {
    assert!(!UpdateOutcome::Running.is_terminal());
    assert!(UpdateOutcome::Succeeded.is_terminal());
    assert!(UpdateOutcome::Failed.is_terminal());
    assert!(UpdateOutcome::RolledBack.is_terminal());
}

#[test]
fn step_round_trips_through_as_str() {
    for step in [
        UpdateStep::Prereqs,
        UpdateStep::Backup,
        UpdateStep::Pull,
        UpdateStep::Migrate,
        UpdateStep::Restart,
    ] {
        let parsed = UpdateStep::parse(step.as_str()).expect("must parse");
        assert_eq!(parsed, step);
    }
}

#[test]
fn rollback_applies_after_mutation_started_only() {
    assert!(!UpdateStep::Prereqs.rolls_back_on_failure());
    assert!(!UpdateStep::Backup.rolls_back_on_failure());
    assert!(UpdateStep::Pull.rolls_back_on_failure());
    assert!(UpdateStep::Migrate.rolls_back_on_failure());
    assert!(!UpdateStep::Restart.rolls_back_on_failure());
}

#[test]
fn lock_staleness_is_strictly_past_ttl() {
    let lock = UpdateLock {
        run_id: "run-1".to_string(),
        acquired_at_unix: 1_000,
        ttl_secs: 1_800,
    };
    assert!(!lock.is_stale(1_000));
    assert!(!lock.is_stale(2_800));
    assert!(lock.is_stale(2_801));
}

#[test]
fn layout_paths_hang_off_state_and_backups() {
    let layout = SiteLayout::new("/srv/site", "/srv/drydock");
    assert_eq!(layout.lock_path(), PathBuf::from("/srv/drydock/state/lock"));
    assert_eq!(
        layout.run_path("run-1-2"),
        PathBuf::from("/srv/drydock/state/runs/run-1-2.run")
    );
    assert_eq!(
        layout.backup_record_path("bak-9"),
        PathBuf::from("/srv/drydock/state/backups/bak-9.backup")
    );
    assert_eq!(
        layout.backup_files_dir("bak-9"),
        PathBuf::from("/srv/drydock/backups/bak-9/files")
    );
    assert_eq!(
        layout.backup_db_dump_path("bak-9"),
        PathBuf::from("/srv/drydock/backups/bak-9/db.sql")
    );
}

#[test]
fn config_defaults_resolve_external_commands() {
    let config = UpdateConfig::default();
    assert_eq!(config.branch, "main");
    assert_eq!(config.lock_ttl_secs, 1_800);
    assert_eq!(
        config.dump_command(),
        vec!["mysqldump", "--single-transaction", "catalog"]
    );
    assert_eq!(config.restore_command(), vec!["mysql", "catalog"]);
    assert_eq!(
        config.restart_command_line(),
        vec!["supervisorctl", "restart", "catalog-site"]
    );
    assert_eq!(
        config.migrate_command_line(),
        vec!["php", "artisan", "migrate", "--force"]
    );
    assert_eq!(config.dump_tool(), "mysqldump");
    assert_eq!(config.supervisor_tool(), "supervisorctl");
}

#[test]
fn config_overrides_win_over_defaults() {
    let mut config = UpdateConfig::default();
    config.db_dump_command = vec!["pg_dump".to_string(), "shop".to_string()];
    config.restart_command = vec!["systemctl".to_string(), "restart".to_string()];
    assert_eq!(config.dump_command(), vec!["pg_dump", "shop"]);
    assert_eq!(config.dump_tool(), "pg_dump");
    assert_eq!(config.supervisor_tool(), "systemctl");
}

#[test]
fn config_load_defaults_when_file_is_missing() {
    let root = test_root();
    fs::create_dir_all(&root).expect("must create root");

    let config = UpdateConfig::load(&root).expect("must load defaults");
    assert_eq!(config, UpdateConfig::default());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn config_save_load_round_trip() {
    let root = test_root();
    fs::create_dir_all(&root).expect("must create root");

    let mut config = UpdateConfig::default();
    config.repo_url = "https://example.com/site.git".to_string();
    config.branch = "release".to_string();
    config.lock_ttl_secs = 600;
    config.save(&root).expect("must save config");

    let loaded = UpdateConfig::load(&root).expect("must load config");
    assert_eq!(loaded, config);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn config_load_accepts_partial_file() {
    let root = test_root();
    fs::create_dir_all(&root).expect("must create root");
    fs::write(
        root.join("drydock.toml"),
        "repo_url = \"https://example.com/site.git\"\n",
    )
    .expect("must write config");

    let config = UpdateConfig::load(&root).expect("must load config");
    assert_eq!(config.repo_url, "https://example.com/site.git");
    assert_eq!(config.branch, "main");
    assert_eq!(config.lock_ttl_secs, 1_800);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn require_repo_url_rejects_empty() {
    let config = UpdateConfig::default();
    let err = config
        .require_repo_url()
        .expect_err("must reject empty repo_url");
    assert!(err.to_string().contains("config-incomplete"));
}

#[test]
fn run_ids_carry_timestamp_and_pid() {
    let run_id = mint_run_id(1_771_001_234);
    assert!(run_id.starts_with("run-1771001234-"));
}

fn test_root() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "drydock-core-tests-{}-{}",
        std::process::id(),
        crate::unique_suffix()
    ));
    path
}

#[test]
fn timestamps_are_not_before_build_era() {
    assert!(current_unix_timestamp() > 1_600_000_000);
}
