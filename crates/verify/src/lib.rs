//! Fachowiec Pro front-end verification
//!
//! Drives a headless browser against a locally served build of the
//! front-end and checks that the settings form and the estimate edit form
//! persist what the user entered:
//!
//! - Seeds local storage with fixture estimates before the app boots
//! - Controls Playwright through a long-lived Node.js driver process
//! - Separates hard waits (abort the run) from soft waits (logged only)
//! - Reports persistence checks as PASS/FAIL lines and an exit status
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 fachowiec-verify (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  runner::run_scenarios(config, [Scenario])                  │
//! │    └── Scenario::execute -> Session::scoped(...)            │
//! │          ├── goto / wait_for_selector / reload              │
//! │          ├── fixture::inject_fixture                        │
//! │          ├── fill / click / click_by_title                  │
//! │          ├── report::soft_wait, Report::assert_persisted    │
//! │          └── screenshot::capture                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Session ──Driver──> PlaywrightDriver                       │
//! │                        node -e driver.js  (JSON lines)      │
//! │                          └── chromium / firefox / webkit    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod fixture;
pub mod playwright;
pub mod protocol;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod screenshot;
pub mod selectors;
pub mod session;
pub mod target;

pub use config::VerifyConfig;
pub use error::{VerifyError, VerifyResult};
pub use report::Report;
pub use scenarios::Scenario;
pub use session::Session;
