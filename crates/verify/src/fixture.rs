//! Estimate fixtures seeded into the page's local storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::VerifyResult;
use crate::session::Session;

/// Writes `arg[1]` under key `arg[0]`, replacing whatever was stored
const STORE_SCRIPT: &str = "([key, value]) => { window.localStorage.setItem(key, value); }";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateItem {
    pub description: String,
    pub quantity: u32,
    pub price: f64,
}

/// An estimate as the front-end keeps it in local storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRecord {
    pub id: String,
    pub title: String,
    pub client_id: String,
    pub client_name: String,
    pub items: Vec<EstimateItem>,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

impl EstimateRecord {
    /// Build a record whose total is the sum of its line items
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        client_id: impl Into<String>,
        client_name: impl Into<String>,
        items: Vec<EstimateItem>,
    ) -> Self {
        let mut record = Self {
            id: id.into(),
            title: title.into(),
            client_id: client_id.into(),
            client_name: client_name.into(),
            items,
            total: 0.0,
            created_at: Utc::now(),
        };
        record.total = record.items_total();
        record
    }

    /// The single estimate the multi-page flow edits
    pub fn existing_estimate() -> Self {
        Self::new(
            "101",
            "Existing Estimate",
            "1",
            "Test Client",
            vec![EstimateItem {
                description: "Service".to_string(),
                quantity: 1,
                price: 100.0,
            }],
        )
    }

    pub fn items_total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }
}

/// Replace the stored estimate list with `records`.
///
/// The application reads storage at boot, so callers reload afterwards.
pub async fn inject_fixture(
    session: &mut Session,
    key: &str,
    records: &[EstimateRecord],
) -> VerifyResult<()> {
    let payload = serde_json::to_string(records)?;
    info!("Seeding {} estimate(s) under '{}'", records.len(), key);
    session
        .evaluate(STORE_SCRIPT, Value::from(vec![key.to_string(), payload]))
        .await?;
    Ok(())
}

/// Estimates currently stored under `key`; empty when nothing is stored
pub async fn read_fixtures(session: &mut Session, key: &str) -> VerifyResult<Vec<EstimateRecord>> {
    match session.read_storage(key).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}
