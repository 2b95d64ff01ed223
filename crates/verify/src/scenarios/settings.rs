//! Single-page flow: settings form persistence across a reload

use std::time::Duration;

use tracing::info;

use crate::config::VerifyConfig;
use crate::error::VerifyResult;
use crate::report::{soft_wait, Report};
use crate::screenshot::capture;
use crate::selectors::{self, text};
use crate::session::Session;

pub const FILLED_SCREENSHOT: &str = "settings_filled.png";
pub const PERSISTED_SCREENSHOT: &str = "settings_persisted.png";

pub const TOAST_TIMEOUT: Duration = Duration::from_millis(2000);
pub const TOAST_MISSING: &str = "Toast not found within 2s, checking persistence directly.";

/// A settings form field and the value written into it
#[derive(Debug, Clone, Copy)]
pub struct SettingsField {
    pub selector: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

pub const COMPANY_PROFILE: [SettingsField; 5] = [
    SettingsField {
        selector: selectors::COMPANY_NAME_FIELD,
        label: "Company Name",
        value: "Super Firma Remontowa",
    },
    SettingsField {
        selector: selectors::NIP_FIELD,
        label: "NIP",
        value: "111-222-33-44",
    },
    SettingsField {
        selector: selectors::ADDRESS_FIELD,
        label: "Address",
        value: "ul. Testowa 5, 00-000 Warszawa",
    },
    SettingsField {
        selector: selectors::PHONE_FIELD,
        label: "Phone",
        value: "987 654 321",
    },
    SettingsField {
        selector: selectors::BANK_ACCOUNT_FIELD,
        label: "Bank Account",
        value: "12 3456 7890 0000 0000 1234 5678",
    },
];

pub async fn run(session: &mut Session, config: &VerifyConfig) -> VerifyResult<Report> {
    let mut report = Report::new("settings");
    let header = selectors::settings_header();

    session.goto("/settings").await?;
    session.wait_for_selector(&header, None).await?;

    for field in &COMPANY_PROFILE {
        session.fill(field.selector, field.value).await?;
    }

    session.click(&selectors::save_button(), true).await?;
    soft_wait(
        session,
        &text(selectors::SETTINGS_SAVED_TOAST),
        TOAST_TIMEOUT,
        &mut report,
        TOAST_MISSING,
    )
    .await?;

    capture(session, &config.output_path(FILLED_SCREENSHOT), &mut report).await;

    session.reload().await?;
    session.wait_for_selector(&header, None).await?;

    info!("Checking persisted settings");
    for field in &COMPANY_PROFILE {
        let actual = session.input_value(field.selector).await?;
        report.assert_persisted(field.label, &actual, field.value);
    }

    capture(session, &config.output_path(PERSISTED_SCREENSHOT), &mut report).await;

    Ok(report)
}
