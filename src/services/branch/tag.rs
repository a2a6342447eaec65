//! Docker Tag Computation
//!
//! Tags are a pure function of branch name, branch type and build number:
//! no clock, no randomness, so rebuilding the same build number reproduces
//! the same tag.

use release_cascade_core::{normalize_branch_name, BranchType};

use super::info::BranchInfo;

/// Lower-case and replace every character outside `[a-z0-9]` with `-`.
pub fn sanitize_tag_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Tag for an arbitrary branch name and type.
pub fn docker_tag(name: &str, branch_type: BranchType, build_number: u64) -> String {
    let name = normalize_branch_name(name);
    let suffix = || {
        let rest = branch_type
            .prefix()
            .and_then(|prefix| name.strip_prefix(prefix))
            .unwrap_or(name);
        sanitize_tag_component(rest)
    };

    match branch_type {
        BranchType::Main => build_number.to_string(),
        BranchType::Develop => format!("dev-{}", build_number),
        BranchType::Feature => format!("feature-{}-{}", suffix(), build_number),
        BranchType::Release => format!("rc-{}-{}", suffix(), build_number),
        BranchType::Hotfix => format!("hotfix-{}-{}", suffix(), build_number),
        BranchType::Bugfix | BranchType::Custom => {
            format!("{}-{}", sanitize_tag_component(name), build_number)
        }
    }
}

/// Tag for a branch's image at `build_number`.
pub fn compute_docker_tag(info: &BranchInfo, build_number: u64) -> String {
    docker_tag(&info.name, info.branch_type, build_number)
}
