use std::fs;

use drydock_core::{PrereqReport, SiteLayout, UpdateConfig, UpdateLogEntry, VersionInfo};
use drydock_state::{latest_run_entry, lock_is_held};
use drydock_vcs::current_version_info;

use crate::prereqs::collect_prereqs;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub version: Option<VersionInfo>,
    pub uptime_secs: Option<u64>,
    pub lock_held: bool,
    pub prereqs: PrereqReport,
    pub last_run: Option<UpdateLogEntry>,
}

pub fn collect_status(layout: &SiteLayout, config: &UpdateConfig) -> StatusReport {
    StatusReport {
        version: current_version_info(layout.site_root()).ok(),
        uptime_secs: host_uptime_secs(),
        lock_held: lock_is_held(layout),
        prereqs: collect_prereqs(layout, config),
        last_run: latest_run_entry(layout).ok().flatten(),
    }
}

fn host_uptime_secs() -> Option<u64> {
    let raw = fs::read_to_string("/proc/uptime").ok()?;
    parse_proc_uptime(&raw)
}

pub(crate) fn parse_proc_uptime(raw: &str) -> Option<u64> {
    let seconds: f64 = raw.split_whitespace().next()?.parse().ok()?;
    if seconds.is_sign_negative() {
        return None;
    }
    Some(seconds as u64)
}
