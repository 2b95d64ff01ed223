//! In-memory stand-in for the Playwright driver
//!
//! `FakeApp` models the parts of the Fachowiec Pro front-end the procedures
//! touch: the settings form, the estimate list with its edit form, a toast,
//! and local storage that survives reloads while in-page state does not.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use fachowiec_verify::config::VerifyConfig;
use fachowiec_verify::driver::Driver;
use fachowiec_verify::protocol::{Command, FailureKind, Reply, WaitState};
use fachowiec_verify::{Session, VerifyResult};

pub const BASE_URL: &str = "http://localhost:4173";
pub const ESTIMATES_KEY: &str = "estimates";
pub const SETTINGS_KEY: &str = "settings";

const SETTINGS_FIELDS: [&str; 6] = [
    "name",
    "companyName",
    "nip",
    "address",
    "phone",
    "bankAccount",
];

#[derive(Debug, Clone)]
pub struct FakeOptions {
    /// Show "Ustawienia zapisane" after saving settings
    pub show_toast: bool,
    /// Write settings to storage on save
    pub persist_settings: bool,
    /// Refuse to write screenshots
    pub fail_screenshots: bool,
    /// Never answer selector waits
    pub stall_waits: bool,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            show_toast: true,
            persist_settings: true,
            fail_screenshots: false,
            stall_waits: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeApp {
    pub options: FakeOptions,
    pub storage: BTreeMap<String, String>,
    pub path: String,
    pub fields: BTreeMap<String, String>,
    pub estimates: Vec<Value>,
    pub editing: Option<usize>,
    pub toast: bool,
    pub commands: Vec<String>,
    pub screenshots: Vec<PathBuf>,
    pub closed: bool,
}

type Outcome = Result<Value, (FailureKind, String)>;

impl FakeApp {
    pub fn new(options: FakeOptions) -> Self {
        Self {
            options,
            path: "/".to_string(),
            ..Default::default()
        }
    }

    /// Application start: everything in-page is rebuilt from storage
    fn boot(&mut self) {
        self.fields.clear();
        self.editing = None;
        self.toast = false;
        self.estimates = self
            .storage
            .get(ESTIMATES_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        if self.path == "/settings" {
            let saved: BTreeMap<String, String> = self
                .storage
                .get(SETTINGS_KEY)
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default();
            for field in SETTINGS_FIELDS {
                let value = saved.get(field).cloned().unwrap_or_default();
                self.fields.insert(field.to_string(), value);
            }
        }
    }

    fn header(&self) -> &'static str {
        match self.path.as_str() {
            "/settings" => "Ustawienia firmy",
            "/estimates" => "Kosztorysy",
            _ => "Pulpit",
        }
    }

    fn buttons(&self) -> Vec<&'static str> {
        match (self.path.as_str(), self.editing) {
            ("/settings", _) | ("/estimates", Some(_)) => vec!["Zapisz zmiany"],
            _ => Vec::new(),
        }
    }

    fn visible_texts(&self) -> Vec<String> {
        let mut texts = vec![self.header().to_string()];
        texts.extend(self.buttons().into_iter().map(String::from));
        match self.path.as_str() {
            "/settings" => {
                texts.push("Dane firmy / użytkownika".to_string());
                if self.toast {
                    texts.push("Ustawienia zapisane".to_string());
                }
            }
            "/estimates" => {
                for estimate in &self.estimates {
                    if let Some(title) = estimate["title"].as_str() {
                        texts.push(title.to_string());
                    }
                }
                if self.editing.is_some() {
                    texts.push("Edytuj kosztorys".to_string());
                }
            }
            _ => {}
        }
        texts
    }

    fn field_visible(&self, id: &str) -> bool {
        match self.path.as_str() {
            "/settings" => SETTINGS_FIELDS.contains(&id),
            "/estimates" => self.editing.is_some() && id == "title",
            _ => false,
        }
    }

    pub fn matches(&self, selector: &str) -> bool {
        if let Some(marker) = selector.strip_prefix("text=") {
            return self.visible_texts().iter().any(|t| t.contains(marker));
        }
        if let Some(marker) = quoted(selector, "h1:has-text('") {
            return self.header() == marker;
        }
        if let Some(marker) = quoted(selector, "button:has-text('") {
            return self.buttons().contains(&marker);
        }
        if let Some(id) = selector.strip_prefix('#') {
            return self.field_visible(id);
        }
        false
    }

    fn save(&mut self) {
        match (self.path.as_str(), self.editing) {
            ("/settings", _) => {
                if self.options.persist_settings {
                    let saved = serde_json::to_string(&self.fields).unwrap();
                    self.storage.insert(SETTINGS_KEY.to_string(), saved);
                }
                self.toast = self.options.show_toast;
            }
            ("/estimates", Some(index)) => {
                let title = self.fields.remove("title").unwrap_or_default();
                self.estimates[index]["title"] = Value::String(title);
                let saved = serde_json::to_string(&self.estimates).unwrap();
                self.storage.insert(ESTIMATES_KEY.to_string(), saved);
                self.editing = None;
            }
            _ => {}
        }
    }

    fn handle(&mut self, command: &Command) -> Outcome {
        self.commands.push(command.describe());

        match command {
            Command::Goto { url } => {
                let path = url.strip_prefix(BASE_URL).unwrap_or(url);
                self.path = if path.is_empty() { "/".to_string() } else { path.to_string() };
                self.boot();
                Ok(Value::Null)
            }
            Command::WaitForSelector {
                selector,
                timeout,
                state,
            } => {
                let visible = self.matches(selector);
                let satisfied = match state {
                    WaitState::Visible | WaitState::Attached => visible,
                    WaitState::Hidden | WaitState::Detached => !visible,
                };
                if satisfied {
                    Ok(Value::Null)
                } else {
                    Err((FailureKind::Timeout, format!("Timeout {}ms exceeded.", timeout)))
                }
            }
            Command::Reload => {
                self.boot();
                Ok(Value::Null)
            }
            Command::Evaluate { arg, .. } => match arg.as_array().map(Vec::as_slice) {
                Some([Value::String(key), Value::String(value)]) => {
                    self.storage.insert(key.clone(), value.clone());
                    Ok(Value::Null)
                }
                _ => Err((FailureKind::Driver, "unsupported script".to_string())),
            },
            Command::Fill { selector, value } => match selector.strip_prefix('#') {
                Some(id) if self.field_visible(id) => {
                    self.fields.insert(id.to_string(), value.clone());
                    Ok(Value::Null)
                }
                _ => Err(not_found(selector)),
            },
            Command::Click { selector, .. } => {
                if selector.starts_with("button:has-text('Zapisz zmiany')") && self.matches(selector) {
                    self.save();
                    Ok(Value::Null)
                } else {
                    Err(not_found(selector))
                }
            }
            Command::ClickByTitle { title, .. } => {
                if self.path == "/estimates" && title == "Edytuj" && !self.estimates.is_empty() {
                    let current = self.estimates[0]["title"].as_str().unwrap_or_default().to_string();
                    self.fields.insert("title".to_string(), current);
                    self.editing = Some(0);
                    Ok(Value::Null)
                } else {
                    Err(not_found(title))
                }
            }
            Command::InputValue { selector } => match selector.strip_prefix('#') {
                Some(id) if self.field_visible(id) => Ok(Value::String(
                    self.fields.get(id).cloned().unwrap_or_default(),
                )),
                _ => Err(not_found(selector)),
            },
            Command::Screenshot { path, .. } => {
                if self.options.fail_screenshots {
                    return Err((
                        FailureKind::Io,
                        format!("EACCES: permission denied, open '{}'", path.display()),
                    ));
                }
                std::fs::write(path, b"\x89PNG\r\n\x1a\n")
                    .map_err(|e| (FailureKind::Io, e.to_string()))?;
                self.screenshots.push(path.clone());
                Ok(Value::Null)
            }
            Command::ReadStorage { key } => Ok(self
                .storage
                .get(key)
                .cloned()
                .map(Value::String)
                .unwrap_or(Value::Null)),
            Command::Close => {
                self.closed = true;
                Ok(Value::Null)
            }
        }
    }
}

fn quoted<'a>(selector: &'a str, prefix: &str) -> Option<&'a str> {
    selector.strip_prefix(prefix)?.strip_suffix("')")
}

fn not_found(selector: &str) -> (FailureKind, String) {
    (FailureKind::NotFound, format!("no element matches {}", selector))
}

pub type FakeAppHandle = Arc<Mutex<FakeApp>>;

pub struct FakeDriver {
    app: FakeAppHandle,
    next_id: u64,
    default_timeout_ms: u64,
}

#[async_trait]
impl Driver for FakeDriver {
    async fn call(&mut self, command: Command) -> VerifyResult<Value> {
        let stall = matches!(command, Command::WaitForSelector { .. })
            && self.app.lock().options.stall_waits;
        if stall {
            std::future::pending::<()>().await;
        }

        let id = self.next_id;
        self.next_id += 1;

        let outcome = self.app.lock().handle(&command);
        let reply = match outcome {
            Ok(value) => Reply::success(id, value),
            Err((kind, message)) => Reply::failure(id, kind, message),
        };
        reply.into_result(&command, self.default_timeout_ms)
    }

    async fn shutdown(&mut self) -> VerifyResult<()> {
        self.app.lock().closed = true;
        Ok(())
    }
}

pub fn test_config(output_dir: &Path) -> VerifyConfig {
    VerifyConfig {
        base_url: BASE_URL.to_string(),
        output_dir: output_dir.to_path_buf(),
        default_timeout_ms: 2_000,
        driver_slack_ms: 200,
        ..Default::default()
    }
}

/// A session backed by a fresh fake app, plus a handle to inspect the app
pub fn fake_session(options: FakeOptions, config: &VerifyConfig) -> (Session, FakeAppHandle) {
    let app = Arc::new(Mutex::new(FakeApp::new(options)));
    let driver = FakeDriver {
        app: Arc::clone(&app),
        next_id: 1,
        default_timeout_ms: config.default_timeout_ms,
    };
    (Session::with_driver(Box::new(driver), config), app)
}
