//! Finding deduplication.

use std::collections::HashSet;

use crate::analysis::Finding;

/// Collapse repeated findings, keyed by their human-readable message.
///
/// Different rules (or the same rule matching twice) can produce the same
/// advice; the author should never read it twice in one advisory. The
/// first occurrence wins and relative order is preserved, so the result
/// is stable under repeated application.
pub fn dedupe_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|finding| seen.insert(finding.message.clone()))
        .collect()
}
