mod profiles;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Browser;
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use sitecrawl_core::{CrawlError, Renderer};

pub use profiles::{default_profiles, RenderProfile};

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(15);
const ACCESS_DENIED_MARKER: &str = "Access Denied";

/// Headless-browser renderer adapter (§4.2). Holds one long-lived Chromium
/// instance per worker, established by trying `default_profiles()` against
/// the site's seed URL in order and keeping the first one that isn't turned
/// away. Every subsequent `render` call opens and tears down its own page
/// against that same browser.
pub struct ChromeRenderer {
    browser: Mutex<Browser>,
    profile_name: &'static str,
}

impl ChromeRenderer {
    /// Tries each profile against `seed` in turn, keeping the first browser
    /// whose rendered title/body doesn't contain "Access Denied". Fails
    /// fatally (§4.2) only if every profile is rejected.
    pub async fn establish(seed: &Url) -> Result<Self, CrawlError> {
        let exe = find_chrome_executable()
            .ok_or_else(|| CrawlError::Render("no chromium executable found".to_string()))?;

        let mut last_err = None;
        for profile in default_profiles() {
            match Self::try_profile(&exe, &profile, seed).await {
                Ok(browser) => {
                    info!(profile = profile.name, "renderer profile accepted");
                    return Ok(Self {
                        browser: Mutex::new(browser),
                        profile_name: profile.name,
                    });
                }
                Err(e) => {
                    warn!(profile = profile.name, error = %e, "renderer profile rejected");
                    last_err = Some(e);
                }
            }
        }

        Err(CrawlError::Render(format!(
            "failed to get rendered HTML from any browser profile: {}",
            last_err.unwrap_or_else(|| "no profiles configured".to_string())
        )))
    }

    async fn try_profile(
        exe: &str,
        profile: &RenderProfile,
        url: &Url,
    ) -> Result<Browser, String> {
        let config = profiles::build_config(exe, profile)?;
        let (mut browser, mut handler) =
            Browser::launch(config).await.map_err(|e| e.to_string())?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });

        match Self::load_once(&mut browser, url).await {
            Ok(html) if html.contains(ACCESS_DENIED_MARKER) => {
                let _ = browser.close().await;
                Err("page content indicates access denied".to_string())
            }
            Ok(_) => Ok(browser),
            Err(e) => {
                let _ = browser.close().await;
                Err(e)
            }
        }
    }

    async fn load_once(browser: &mut Browser, url: &Url) -> Result<String, String> {
        let page = browser.new_page("about:blank").await.map_err(|e| e.to_string())?;
        page.evaluate_on_new_document(profiles::STEALTH_INIT_SCRIPT)
            .await
            .map_err(|e| e.to_string())?;

        let result = tokio::time::timeout(PAGE_LOAD_TIMEOUT, async {
            page.goto(url.as_str()).await.map_err(|e| e.to_string())?;
            page.wait_for_navigation().await.map_err(|e| e.to_string())?;
            let title = page.get_title().await.map_err(|e| e.to_string())?.unwrap_or_default();
            let content = page.content().await.map_err(|e| e.to_string())?;
            Ok::<_, String>(format!("{title}\u{0}{content}"))
        })
        .await
        .map_err(|_| "page load timed out".to_string())??;

        let _ = page.close().await;
        Ok(result)
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &Url) -> Result<String, CrawlError> {
        let browser = self.browser.lock().await;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CrawlError::Render(e.to_string()))?;

        // Page handle is always torn down, success or failure (§5).
        let outcome = async {
            page.evaluate_on_new_document(profiles::STEALTH_INIT_SCRIPT)
                .await
                .map_err(|e| CrawlError::Render(e.to_string()))?;

            tokio::time::timeout(PAGE_LOAD_TIMEOUT, async {
                page.goto(url.as_str())
                    .await
                    .map_err(|e| CrawlError::Render(e.to_string()))?;
                page.wait_for_navigation()
                    .await
                    .map_err(|e| CrawlError::Render(e.to_string()))?;
                page.content().await.map_err(|e| CrawlError::Render(e.to_string()))
            })
            .await
            .map_err(|_| CrawlError::Timeout(PAGE_LOAD_TIMEOUT.as_secs()))?
        }
        .await;

        let _ = page.close().await;
        outcome
    }
}

fn find_chrome_executable() -> Option<String> {
    if let Ok(p) = std::env::var("CHROME_EXECUTABLE") {
        if Path::new(&p).exists() {
            return Some(p);
        }
    }
    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path.to_string_lossy().into_owned());
        }
    }
    None
}

/// Exposes which renderer profile a `ChromeRenderer` settled on, primarily
/// for logging at engine startup.
pub fn profile_name(renderer: &ChromeRenderer) -> &'static str {
    renderer.profile_name
}
