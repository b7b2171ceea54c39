mod backup_catalog;
mod lock;
mod run_log;

pub use backup_catalog::{
    list_backups, page_backups, read_backup_record, write_backup_record,
};
pub use lock::{acquire_lock, clean_stale_locks, lock_is_held, read_lock, release_lock};
pub use run_log::{
    latest_run_entry, list_run_entries, page_run_entries, read_run_entry, running_run_entries,
    write_run_entry,
};

pub(crate) fn page_slice<T>(items: Vec<T>, page: usize, limit: usize) -> Vec<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    items
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect()
}
