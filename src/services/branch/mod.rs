//! Branch Classification & Policy
//!
//! Maps branch names to types, policies and image tags.

pub mod glob;
pub mod info;
pub mod table;
pub mod tag;

pub use glob::{BranchPattern, GlobPattern};
pub use info::BranchInfo;
pub use table::{main_policy, PolicyResolution, PolicySource, PolicyTable, DEFAULT_POLICY_KEY};
pub use tag::{compute_docker_tag, docker_tag, sanitize_tag_component};
