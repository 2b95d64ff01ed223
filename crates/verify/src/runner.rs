//! Runs a sequence of procedures, each in its own browser session

use std::time::Instant;

use tracing::{error, info};

use crate::config::VerifyConfig;
use crate::error::VerifyResult;
use crate::report::Report;
use crate::scenarios::Scenario;

/// Outcome of running one or more procedures
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<Report>,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.passed()
    }

    /// 0 when every check of every procedure passed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.failed() == 0 {
            0
        } else {
            1
        }
    }
}

/// Run `scenarios` one after another.
///
/// A fatal error in any procedure ends the whole run.
pub async fn run_scenarios(
    config: &VerifyConfig,
    scenarios: &[Scenario],
) -> VerifyResult<RunSummary> {
    let start = Instant::now();
    let mut reports = Vec::with_capacity(scenarios.len());

    info!("Running {} procedure(s) against {}", scenarios.len(), config.base_url);

    for scenario in scenarios {
        let scenario_start = Instant::now();
        let report = match scenario.execute(config).await {
            Ok(report) => report,
            Err(e) => {
                error!("✗ {} - {}", scenario.name(), e);
                return Err(e);
            }
        };

        let elapsed = scenario_start.elapsed().as_millis();
        if report.passed() {
            info!("✓ {} ({} ms)", report.name, elapsed);
        } else {
            error!(
                "✗ {} - {} check(s) failed ({} ms)",
                report.name,
                report.failures().count(),
                elapsed
            );
        }
        reports.push(report);
    }

    let summary = RunSummary {
        reports,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Results: {} passed, {} failed ({} ms)",
        summary.passed(),
        summary.failed(),
        summary.duration_ms
    );

    Ok(summary)
}
