//! fachowiec-verify - browser verification for the Fachowiec Pro front-end
//!
//! Exit status: 0 when every check passed, 1 when a persistence check
//! failed, 2 when the run was aborted by a fatal error.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fachowiec_verify::config::{Browser, VerifyConfig};
use fachowiec_verify::runner::run_scenarios;
use fachowiec_verify::{target, Scenario};

#[derive(Parser, Debug)]
#[command(name = "fachowiec-verify")]
#[command(author, version, about = "Browser verification for the Fachowiec Pro front-end")]
struct Cli {
    /// Configuration file (missing file = defaults)
    #[arg(long, default_value = "verify.toml", global = true, env = "VERIFY_CONFIG")]
    config: PathBuf,

    /// Origin serving the built front-end
    #[arg(long, global = true, env = "VERIFY_BASE_URL")]
    base_url: Option<String>,

    /// Browser engine
    #[arg(long, global = true, value_enum)]
    browser: Option<Browser>,

    /// Run without a browser window (`--headless false` shows it)
    #[arg(long, global = true, env = "VERIFY_HEADLESS")]
    headless: Option<bool>,

    /// Viewport width
    #[arg(long, global = true)]
    viewport_width: Option<u32>,

    /// Viewport height
    #[arg(long, global = true)]
    viewport_height: Option<u32>,

    /// Root directory for screenshots
    #[arg(short, long, global = true, env = "VERIFY_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Directory whose node_modules provides playwright
    #[arg(long, global = true, env = "VERIFY_DRIVER_DIR")]
    driver_dir: Option<PathBuf>,

    /// Check that the front-end answers before launching a browser
    #[arg(long, global = true)]
    probe: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed an estimate, then exercise the settings and estimate edit forms
    Frontend,
    /// Fill the settings form and check it survives a reload
    Settings,
    /// Run both procedures, each in its own browser
    All,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<VerifyConfig> {
        let mut config = VerifyConfig::load(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))?;

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(browser) = self.browser {
            config.browser = browser;
        }
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(width) = self.viewport_width {
            config.viewport.width = width;
        }
        if let Some(height) = self.viewport_height {
            config.viewport.height = height;
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(driver_dir) = &self.driver_dir {
            config.driver_dir = driver_dir.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn scenarios(&self) -> Vec<Scenario> {
        match self.command {
            Commands::Frontend => vec![Scenario::Frontend],
            Commands::Settings => vec![Scenario::Settings],
            Commands::All => Scenario::ALL.to_vec(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = cli.resolve_config()?;

    if cli.probe {
        target::wait_until_reachable(&config.base_url, config.probe_timeout()).await?;
    }

    let summary = run_scenarios(&config, &cli.scenarios()).await?;
    Ok(summary.exit_code())
}
