//! The verification procedures

pub mod frontend;
pub mod settings;

use futures::FutureExt;

use crate::config::VerifyConfig;
use crate::error::VerifyResult;
use crate::report::Report;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Seeded estimate, settings form and estimate edit form
    Frontend,
    /// Settings form persistence across a reload
    Settings,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Frontend, Scenario::Settings];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Frontend => "frontend",
            Scenario::Settings => "settings",
        }
    }

    /// Run the procedure in an already open session
    pub async fn run(&self, session: &mut Session, config: &VerifyConfig) -> VerifyResult<Report> {
        match self {
            Scenario::Frontend => frontend::run(session, config).await,
            Scenario::Settings => settings::run(session, config).await,
        }
    }

    /// Run the procedure in a fresh browser session that is closed afterwards
    pub async fn execute(self, config: &VerifyConfig) -> VerifyResult<Report> {
        let procedure_config = config.clone();
        Session::scoped(config, move |session| {
            async move { self.run(session, &procedure_config).await }.boxed()
        })
        .await
    }
}
