//! Browser lifecycle management using Chrome DevTools Protocol

use crate::driver::{PageDriver, SessionProvider};
use headless_chrome::{browser::default_executable, Browser, LaunchOptions, Tab};
use slotscan_core::{Error, Result};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Page-load and default element-wait timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            timeout_seconds: 30,
        }
    }
}

static BROWSER_BINARY: OnceLock<std::result::Result<PathBuf, String>> = OnceLock::new();

/// Resolve the Chrome/Chromium executable, caching the answer for the
/// process lifetime. Resolution cost is environment-invariant, so the
/// first lookup decides for every later session.
pub fn resolve_browser_binary() -> Result<PathBuf> {
    match BROWSER_BINARY.get_or_init(|| default_executable().map_err(|e| e.to_string())) {
        Ok(path) => Ok(path.clone()),
        Err(e) => Err(Error::Provisioning(format!(
            "no Chrome or Chromium executable found on this host: {}",
            e
        ))),
    }
}

/// Active browser session driving one Chrome process over CDP.
///
/// A session's lifetime is exactly one availability check. Disposal kills
/// the Chrome process and removes its temporary profile directory.
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// Single tab the whole check runs in
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a headless browser suited to containerized execution: fixed
    /// viewport, GPU disabled, sandbox off.
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        let binary = resolve_browser_binary()?;

        info!(
            "Launching browser (headless: {}, size: {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some((config.window_width, config.window_height)))
            .path(Some(binary))
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
            ])
            .build()
            .map_err(|e| Error::Provisioning(format!("invalid launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Provisioning(format!("failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Provisioning(format!("failed to open tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(config.timeout_seconds));

        debug!("Browser launched");

        Ok(Self { browser, tab })
    }
}

impl PageDriver for BrowserSession {
    fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| Error::Navigation(format!("failed to open {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::Navigation(format!("page load timed out for {}: {}", url, e)))?;

        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        debug!("Waiting for {} (timeout: {:?})", selector, timeout);

        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|e| Error::Browser(format!("element {} not found: {}", selector, e)))
    }

    fn attr_values(&self, selector: &str, attr: &str) -> Result<Vec<String>> {
        let elements = match self.tab.find_elements(selector) {
            Ok(elements) => elements,
            Err(_) => return Ok(Vec::new()),
        };

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            // A control disappearing mid-scan is skipped, not fatal.
            match element.get_attribute_value(attr) {
                Ok(Some(value)) => values.push(value),
                Ok(None) => {}
                Err(e) => debug!("Skipping stale element during scan: {}", e),
            }
        }
        Ok(values)
    }

    fn click_where_attr(&self, selector: &str, attr: &str, needles: &[&str]) -> Result<bool> {
        let elements = match self.tab.find_elements(selector) {
            Ok(elements) => elements,
            Err(_) => return Ok(false),
        };

        for element in elements {
            let value = match element.get_attribute_value(attr) {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(e) => {
                    debug!("Skipping stale element during lookup: {}", e);
                    continue;
                }
            };
            if needles.iter().all(|needle| value.contains(needle)) {
                element
                    .click()
                    .map_err(|e| Error::Browser(format!("click failed on {}: {}", selector, e)))?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn click(&self, selector: &str) -> Result<bool> {
        match self.tab.find_element(selector) {
            Ok(element) => {
                element
                    .click()
                    .map_err(|e| Error::Browser(format!("click failed on {}: {}", selector, e)))?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    fn count(&self, selector: &str) -> Result<usize> {
        Ok(self
            .tab
            .find_elements(selector)
            .map(|elements| elements.len())
            .unwrap_or(0))
    }

    fn button_labels(&self) -> Result<Vec<String>> {
        let elements = match self.tab.find_elements("button") {
            Ok(elements) => elements,
            Err(_) => return Ok(Vec::new()),
        };

        let mut labels = Vec::with_capacity(elements.len());
        for element in elements {
            let label = match element.get_attribute_value("aria-label") {
                Ok(Some(value)) if !value.is_empty() => value,
                _ => match element.get_inner_text() {
                    Ok(text) => text,
                    Err(_) => continue,
                },
            };
            labels.push(label);
        }
        Ok(labels)
    }

    fn back(&self) -> Result<()> {
        self.tab
            .evaluate("window.history.back()", false)
            .map(|_| ())
            .map_err(|e| Error::Browser(format!("history back failed: {}", e)))
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn settle(&self, delay: Duration) {
        std::thread::sleep(delay);
    }

    fn dispose(self) -> Result<()> {
        debug!("Closing browser session");
        // Dropping the Browser kills the Chrome process and removes the
        // temporary profile directory.
        drop(self);
        Ok(())
    }
}

/// Launches one fresh Chrome session per check.
#[derive(Debug, Clone, Default)]
pub struct ChromeProvider {
    config: BrowserConfig,
}

impl ChromeProvider {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl SessionProvider for ChromeProvider {
    type Session = BrowserSession;

    fn acquire(&self) -> Result<BrowserSession> {
        BrowserSession::launch(&self.config)
    }
}
