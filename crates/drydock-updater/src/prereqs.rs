use drydock_core::{PrereqReport, SiteLayout, UpdateConfig};
use drydock_vcs::{git_available, inside_work_tree, tool_available};

pub fn collect_prereqs(layout: &SiteLayout, config: &UpdateConfig) -> PrereqReport {
    PrereqReport {
        git_available: git_available(),
        inside_work_tree: inside_work_tree(layout.site_root()),
        supervisor_available: tool_available(&config.supervisor_tool()),
        db_dump_tool_available: tool_available(&config.dump_tool()),
    }
}
