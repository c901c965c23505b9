use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use leadgrid_core::error::AppError;
use leadgrid_core::models::ContactSignals;
use leadgrid_core::traits::PageScraper;
use tokio::task::JoinHandle;

use crate::contacts::extract_contacts;
use crate::guard::check_site;

/// How long each teardown step may take before the process is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Headless-Chromium contact scraper using the Chrome DevTools Protocol.
///
/// Every [`PageScraper::scrape`] call launches its own browser, loads one
/// page, and tears the browser down again whether the load succeeded, failed,
/// or timed out. Nothing is shared between calls, so a wedged page can only
/// ever cost one scrape.
///
/// # Example
///
/// ```rust,no_run
/// use leadgrid_client::BrowserScraper;
/// use leadgrid_core::traits::PageScraper;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let scraper = BrowserScraper::new();
/// let signals = scraper.scrape("https://example.com").await?;
/// println!("{:?}", signals.emails);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BrowserScraper {
    timeout: Duration,
    allow_private: bool,
}

impl Default for BrowserScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserScraper {
    /// A scraper with a **30 s** page-load timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            allow_private: false,
        }
    }

    /// Permit websites that resolve to private or reserved addresses.
    ///
    /// Only use this for CLI usage where the user controls the machine.
    pub fn allow_private_urls(mut self) -> Self {
        self.allow_private = true;
        self
    }

    async fn launch() -> Result<(Browser, JoinHandle<()>), AppError> {
        let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();

        if let Some(bin) = find_chrome_binary() {
            tracing::debug!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled for the connection to make progress.
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser CDP handler stopped: {e}");
                    break;
                }
            }
        });

        Ok((browser, events))
    }
}

/// Locate a Chrome/Chromium binary. `CHROME_BIN` wins; then the real binary
/// inside a snap install (the `/snap/bin` wrapper drops headless flags); then
/// common system paths. `None` leaves the lookup to chromiumoxide.
fn find_chrome_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }

    [
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

async fn render(browser: &Browser, url: &str) -> Result<String, AppError> {
    let page = browser
        .new_page(url)
        .await
        .map_err(|e| AppError::BrowserError(format!("Failed to navigate to {url}: {e}")))?;

    page.find_element("body")
        .await
        .map_err(|e| AppError::BrowserError(format!("Page did not render body: {e}")))?;

    let html = page
        .content()
        .await
        .map_err(|e| AppError::BrowserError(format!("Failed to read page content: {e}")));

    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close tab: {e}");
    }
    html
}

/// The process-level controls used to take a browser down.
trait Teardown {
    async fn close(&mut self) -> Result<(), String>;
    async fn kill(&mut self) -> Result<(), String>;
    async fn wait(&mut self) -> Result<(), String>;
}

impl Teardown for Browser {
    async fn close(&mut self) -> Result<(), String> {
        Browser::close(self).await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn kill(&mut self) -> Result<(), String> {
        match Browser::kill(self).await {
            Some(Err(e)) => Err(e.to_string()),
            _ => Ok(()),
        }
    }

    async fn wait(&mut self) -> Result<(), String> {
        Browser::wait(self).await.map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Ask the browser to close, killing it when that fails or stalls, then reap
/// the process. Every step is bounded by `grace`.
async fn shutdown<B: Teardown>(browser: &mut B, grace: Duration) {
    let closed = match tokio::time::timeout(grace, browser.close()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!("Failed to close browser: {e}");
            false
        }
        Err(_) => {
            tracing::warn!("Browser did not close within {}s", grace.as_secs());
            false
        }
    };

    if !closed {
        match tokio::time::timeout(grace, browser.kill()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to kill browser: {e}"),
            Err(_) => tracing::warn!("Browser kill did not complete"),
        }
    }

    match tokio::time::timeout(grace, browser.wait()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Failed to reap browser process: {e}"),
        Err(_) => tracing::warn!("Browser process still running after teardown"),
    }
}

impl PageScraper for BrowserScraper {
    async fn scrape(&self, url: &str) -> Result<ContactSignals, AppError> {
        let target = check_site(url, self.allow_private).await?;
        let (mut browser, events) = Self::launch().await?;

        let loaded = tokio::time::timeout(self.timeout, render(&browser, target.as_str())).await;

        shutdown(&mut browser, SHUTDOWN_GRACE).await;
        events.abort();

        let html = match loaded {
            Ok(inner) => inner?,
            Err(_) => return Err(AppError::Timeout(self.timeout.as_secs())),
        };
        Ok(extract_contacts(&html, &target))
    }
}
