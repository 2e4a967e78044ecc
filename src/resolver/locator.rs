//! Build locator construction.
//!
//! A locator is a comma-joined list of `dimension:value` clauses understood
//! by the build server's query endpoint.

use std::fmt;

/// Only successful builds.
const STATUS_SUCCESS: &str = "status:SUCCESS";
/// Builds from any branch, default-branch semantics.
const ANY_BRANCH: &str = "branch:default:any";
/// Newest match only.
const LATEST_ONLY: &str = "count:1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    clauses: Vec<String>,
}

impl Locator {
    /// Locator for the newest successful build of a configuration, optionally tagged.
    pub fn latest_successful(build_type_id: &str, tag: &str) -> Self {
        let mut clauses = vec![
            STATUS_SUCCESS.to_string(),
            ANY_BRANCH.to_string(),
            LATEST_ONLY.to_string(),
            format!("buildType:id:{}", build_type_id),
        ];
        if !tag.is_empty() {
            clauses.push(format!("tag:{}", tag));
        }
        Self { clauses }
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clauses.join(","))
    }
}
