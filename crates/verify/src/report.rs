//! Non-fatal checks and the per-procedure report
//!
//! Hard preconditions propagate as errors; everything recorded here only
//! influences the printed PASS/FAIL lines and the final exit status.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use tracing::{info, warn};

use crate::error::VerifyResult;
use crate::session::Session;

/// Result of comparing a live value with the expected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub label: String,
    pub passed: bool,
    pub message: String,
}

/// Compare `actual` with `expected` exactly; never fails
pub fn check_expectation(label: &str, actual: &str, expected: &str) -> CheckOutcome {
    if actual == expected {
        CheckOutcome {
            label: label.to_string(),
            passed: true,
            message: format!("Verification Passed: {} persisted.", label),
        }
    } else {
        CheckOutcome {
            label: label.to_string(),
            passed: false,
            message: format!(
                "Verification Failed: Expected '{}', got '{}'",
                expected, actual
            ),
        }
    }
}

/// Everything one procedure observed that did not abort it
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub name: String,
    pub checks: Vec<CheckOutcome>,
    pub notices: Vec<String>,
    pub screenshots: Vec<PathBuf>,
}

impl Report {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Record and print the outcome of a persistence check
    pub fn assert_persisted(&mut self, label: &str, actual: &str, expected: &str) -> bool {
        let outcome = check_expectation(label, actual, expected);
        if outcome.passed {
            println!("{} {}", "PASS".green().bold(), outcome.message);
            info!("{}", outcome.message);
        } else {
            println!("{} {}", "FAIL".red().bold(), outcome.message);
            warn!("{}", outcome.message);
        }
        let passed = outcome.passed;
        self.checks.push(outcome);
        passed
    }

    /// Record and print a diagnostic that does not affect the outcome
    pub fn notice(&mut self, message: impl Into<String>) {
        let message = message.into();
        println!("{}", message.yellow());
        warn!("{}", message);
        self.notices.push(message);
    }

    pub fn record_screenshot(&mut self, path: PathBuf) {
        self.screenshots.push(path);
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// 0 when every check passed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

/// Wait for a confirmation that is nice to see but not essential.
///
/// A timeout is downgraded to a notice and `false`; any other failure still
/// propagates.
pub async fn soft_wait(
    session: &mut Session,
    selector: &str,
    timeout: Duration,
    report: &mut Report,
    notice: &str,
) -> VerifyResult<bool> {
    match session.wait_for_selector(selector, Some(timeout)).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_timeout() => {
            report.notice(notice);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_values_pass() {
        let outcome = check_expectation("Company Name", "Super Firma Remontowa", "Super Firma Remontowa");
        assert!(outcome.passed);
        assert_eq!(outcome.message, "Verification Passed: Company Name persisted.");
    }

    #[test]
    fn test_mismatch_reports_both_values() {
        let outcome = check_expectation("Company Name", "", "Super Firma Remontowa");
        assert!(!outcome.passed);
        assert_eq!(
            outcome.message,
            "Verification Failed: Expected 'Super Firma Remontowa', got ''"
        );
    }

    #[test]
    fn test_comparison_does_not_trim() {
        assert!(!check_expectation("NIP", "111-222-33-44 ", "111-222-33-44").passed);
    }

    #[test]
    fn test_report_exit_code_follows_checks() {
        let mut report = Report::new("settings");
        assert_eq!(report.exit_code(), 0);

        report.assert_persisted("NIP", "111-222-33-44", "111-222-33-44");
        assert_eq!(report.exit_code(), 0);

        report.assert_persisted("Phone", "", "987 654 321");
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_notices_do_not_fail_report() {
        let mut report = Report::new("settings");
        report.notice("Toast not found within 2s, checking persistence directly.");
        assert!(report.passed());
        assert_eq!(report.notices.len(), 1);
    }
}
