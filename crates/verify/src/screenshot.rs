//! Screenshot checkpoints

use std::path::Path;

use crate::report::Report;
use crate::session::Session;

/// Capture a full-page screenshot at a named checkpoint.
///
/// A failure becomes a notice in the report and the procedure continues.
/// Returns whether the file was written.
pub async fn capture(session: &mut Session, path: &Path, report: &mut Report) -> bool {
    match session.screenshot(path).await {
        Ok(()) => {
            report.record_screenshot(path.to_path_buf());
            true
        }
        Err(e) => {
            report.notice(format!("Screenshot {} not written: {}", path.display(), e));
            false
        }
    }
}
