mod git;
mod probes;
mod pull;
mod remote;
mod version;

pub use git::validate_commit_hash;
pub use probes::{git_available, inside_work_tree, tool_available};
pub use pull::fast_forward;
pub use remote::check_remote;
pub use version::current_version_info;
