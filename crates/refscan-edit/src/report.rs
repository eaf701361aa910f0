//! Status lines for presenting scan and replacement outcomes

use crate::error::EditError;
use crate::replace::ReplaceReport;
use refscan_core::ScanResult;
use serde::Serialize;
use std::fmt::{self, Display};

/// Status line plus detail line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    status: String,
    detail: String,
}

impl StatusReport {
    /// Report for an analysis run
    #[must_use]
    pub fn for_scan(result: &ScanResult) -> Self {
        if result.is_empty() {
            return Self::message("No references found in the selected root.");
        }
        Self {
            status: format!(
                "Found {} references (skipped {}).",
                result.match_count(),
                result.incompatible_count()
            ),
            detail: detail(result),
        }
    }

    /// Report for an applied replacement
    #[must_use]
    pub fn for_replacement(result: &ScanResult, report: &ReplaceReport) -> Self {
        if result.is_empty() {
            return Self::for_scan(result);
        }
        Self {
            status: format!(
                "Replaced {} references. Skipped {} incompatible entries.",
                report.replaced, report.incompatible
            ),
            detail: detail(result),
        }
    }

    /// Report for a rejected or failed replacement
    #[must_use]
    pub fn for_edit_error(error: &EditError) -> Self {
        match error {
            EditError::SourceIsTarget => Self::message("Source and replacement are identical."),
            other => Self::message(format!("Replacement failed: {other}")),
        }
    }

    /// Report for a scan that did not complete
    #[must_use]
    pub fn failed(error: &dyn Display) -> Self {
        Self::message(format!("Scan failed: {error}"))
    }

    /// Status line
    #[inline]
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Detail line (empty when there is nothing to detail)
    #[inline]
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    fn message(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            detail: String::new(),
        }
    }
}

impl Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            f.write_str(&self.status)
        } else {
            write!(f, "{}\n{}", self.status, self.detail)
        }
    }
}

fn detail(result: &ScanResult) -> String {
    format!(
        "Visited {} sync members. Last path: {}",
        result.visited_member_count(),
        result.last_matched_path().unwrap_or("n/a")
    )
}
