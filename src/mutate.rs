// mutate.rs — Filtered injection of the profile identifier
//
// Walks the target/configuration snapshot in graph order and assigns
// PROVISIONING_PROFILE on every matching pair. A target that fails its
// filter is skipped whole: its configurations are never visited, let alone
// mutated. Filter mismatches are informational, not errors.

use std::fmt;

use crate::error::Result;
use crate::filter::NameFilter;
use crate::project::ProjectTree;

/// The build setting this tool exists to write.
pub const PROVISIONING_SETTING: &str = "PROVISIONING_PROFILE";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub targets_matched: usize,
    pub targets_skipped: usize,
    pub configurations_updated: usize,
    pub configurations_skipped: usize,
}

impl fmt::Display for MutationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "updated {} configuration(s) across {} target(s); skipped {} target(s), {} configuration(s)",
            self.configurations_updated,
            self.targets_matched,
            self.targets_skipped,
            self.configurations_skipped
        )
    }
}

/// Apply `identifier` to every (target, configuration) pair selected by the
/// two filters. Idempotent: a second application with the same arguments
/// leaves the tree unchanged (single scalar assignment per configuration).
pub fn apply(
    tree: &mut ProjectTree,
    identifier: &str,
    target_filter: &NameFilter,
    config_filter: &NameFilter,
) -> Result<MutationReport> {
    let mut report = MutationReport::default();

    for target in tree.targets()? {
        let target_matches = target_filter.matches(&target.product_name)
            || target_filter.matches(&target.product_type);
        if !target_matches {
            eprintln!(
                "[xcprovision] skipping target {} (filter mismatch)",
                target.product_name
            );
            report.targets_skipped += 1;
            continue;
        }
        report.targets_matched += 1;

        for config in &target.configurations {
            if config_filter.matches(&config.name) {
                tree.set_build_setting(&config.id, PROVISIONING_SETTING, identifier)?;
                report.configurations_updated += 1;
            } else {
                eprintln!(
                    "[xcprovision] skipping configuration {} of target {} (filter mismatch)",
                    config.name, target.product_name
                );
                report.configurations_skipped += 1;
            }
        }
    }

    Ok(report)
}
