//! Multi-page flow: seeded estimate, settings form, estimate edit form

use tracing::info;

use crate::config::VerifyConfig;
use crate::error::VerifyResult;
use crate::fixture::{inject_fixture, EstimateRecord};
use crate::report::Report;
use crate::screenshot::capture;
use crate::selectors::{self, text};
use crate::session::Session;

pub const SETTINGS_SCREENSHOT: &str = "verification/settings_page_filled.png";
pub const ESTIMATES_SCREENSHOT: &str = "verification/estimates_edited_final.png";

pub const PROFILE_NAME: &str = "Jan Kowalski Services";
pub const UPDATED_TITLE: &str = "Updated Estimate Title";

pub async fn run(session: &mut Session, config: &VerifyConfig) -> VerifyResult<Report> {
    let mut report = Report::new("frontend");
    let fixture = EstimateRecord::existing_estimate();

    session.goto("/").await?;
    inject_fixture(session, &config.storage_key, std::slice::from_ref(&fixture)).await?;
    session.reload().await?;

    info!("Checking settings form");
    session.goto("/settings").await?;
    session
        .wait_for_selector(&text(selectors::PROFILE_SECTION), None)
        .await?;
    session.fill(selectors::NAME_FIELD, PROFILE_NAME).await?;
    session.click(&selectors::save_button(), true).await?;
    capture(session, &config.output_path(SETTINGS_SCREENSHOT), &mut report).await;

    info!("Checking estimate edit form");
    session.goto("/estimates").await?;
    session.wait_for_selector(&text(&fixture.title), None).await?;
    session
        .click_by_title(selectors::EDIT_BUTTON_TITLE, true)
        .await?;
    session
        .wait_for_selector(&text(selectors::EDIT_ESTIMATE_HEADER), None)
        .await?;
    session.fill(selectors::TITLE_FIELD, UPDATED_TITLE).await?;
    session.click(&selectors::save_button(), true).await?;
    session.wait_for_selector(&text(UPDATED_TITLE), None).await?;
    capture(session, &config.output_path(ESTIMATES_SCREENSHOT), &mut report).await;

    Ok(report)
}
