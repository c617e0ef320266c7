//! Chromium-backed portal session using chromiumoxide.

use super::PortalSession;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Interval between DOM polls inside a bounded wait.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. CIDADES_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("CIDADES_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.cidades/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".cidades/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".cidades/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".cidades/chromium/chrome-linux64/chrome"),
                home.join(".cidades/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Quote a string as a JS literal for injection into an evaluated script.
fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// A live headless-Chromium session.
///
/// Owns exactly one home tab after `connect`; the detail tab the portal
/// spawns per municipality is the only other tab that ever exists, so
/// tab counts are plain counts.
pub struct ChromiumSession {
    browser: Browser,
    home: Page,
    focused: Mutex<Page>,
}

impl ChromiumSession {
    /// Launch headless Chromium and open the home tab.
    pub async fn connect() -> Result<Self> {
        let chrome_path = find_chromium().context(
            "Chromium not found (install google-chrome or set CIDADES_CHROMIUM_PATH)",
        )?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drive the CDP event stream for the lifetime of the browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let home = browser
            .new_page("about:blank")
            .await
            .context("failed to open home tab")?;

        // The launcher's initial blank target would throw tab counts off.
        let home_id = home.target_id().inner().clone();
        for page in browser.pages().await? {
            if page.target_id().inner() != &home_id {
                let _ = page.close().await;
            }
        }

        Ok(Self {
            browser,
            focused: Mutex::new(home.clone()),
            home,
        })
    }

    /// Close the browser and reap the child process.
    pub async fn shutdown(mut self) -> Result<()> {
        self.browser.close().await?;
        let _ = self.browser.wait().await;
        Ok(())
    }

    async fn focused_page(&self) -> Page {
        self.focused.lock().await.clone()
    }
}

#[async_trait]
impl PortalSession for ChromiumSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "navigating home tab");
        self.home
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        let _ = self.home.wait_for_navigation().await;
        *self.focused.lock().await = self.home.clone();
        Ok(())
    }

    async fn wait_clickable(&self, css: &str, timeout: Duration) -> Result<bool> {
        let page = self.focused_page().await;
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(el) = page.find_element(css).await {
                if el.clickable_point().await.is_ok() {
                    return Ok(true);
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, css: &str) -> Result<()> {
        let page = self.focused_page().await;
        let el = page
            .find_element(css)
            .await
            .map_err(|e| anyhow!("element {css} not found: {e}"))?;
        el.scroll_into_view().await?.click().await?;
        Ok(())
    }

    async fn clear_and_type(&self, css: &str, text: &str) -> Result<()> {
        let page = self.focused_page().await;
        page.evaluate(format!(
            "document.querySelector({}).value = ''",
            js_string(css)
        ))
        .await
        .with_context(|| format!("failed to clear input {css}"))?;

        let el = page
            .find_element(css)
            .await
            .map_err(|e| anyhow!("input {css} not found: {e}"))?;
        el.click().await?;
        el.type_str(text).await?;
        Ok(())
    }

    async fn wait_search_results(&self, text: &str, timeout: Duration) -> Result<Vec<String>> {
        let page = self.focused_page().await;
        let script = format!(
            "Array.from(document.querySelectorAll('li > a'))\
             .map(a => a.textContent.trim())\
             .filter(t => t.includes({}))",
            js_string(text)
        );

        let deadline = Instant::now() + timeout;
        loop {
            let result = page
                .evaluate(script.as_str())
                .await
                .context("failed to query search results")?;
            let texts: Vec<String> = result
                .into_value()
                .map_err(|e| anyhow!("failed to convert search results: {e:?}"))?;
            if !texts.is_empty() {
                return Ok(texts);
            }
            if Instant::now() >= deadline {
                return Ok(Vec::new());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click_result_link(&self, text: &str) -> Result<bool> {
        let page = self.focused_page().await;
        let script = format!(
            "(() => {{\
               const target = {};\
               for (const a of document.querySelectorAll('li > a')) {{\
                 if (a.textContent.trim() === target) {{ a.click(); return true; }}\
               }}\
               return false;\
             }})()",
            js_string(text)
        );
        let result = page
            .evaluate(script)
            .await
            .context("failed to click result link")?;
        result
            .into_value()
            .map_err(|e| anyhow!("failed to convert click result: {e:?}"))
    }

    async fn tab_count(&self) -> Result<usize> {
        Ok(self.browser.pages().await?.len())
    }

    async fn wait_tab_count(&self, n: usize, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.tab_count().await? == n {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn focus_tab(&self, index: usize) -> Result<()> {
        let pages = self.browser.pages().await?;
        let page = pages
            .get(index)
            .ok_or_else(|| anyhow!("tab {index} does not exist ({} open)", pages.len()))?;
        page.bring_to_front().await?;
        *self.focused.lock().await = page.clone();
        Ok(())
    }

    async fn close_extra_tabs(&self) -> Result<usize> {
        let home_id = self.home.target_id().inner().clone();
        let mut closed = 0usize;
        for page in self.browser.pages().await? {
            if page.target_id().inner() != &home_id {
                let _ = page.close().await;
                closed += 1;
            }
        }
        if closed > 0 {
            debug!(closed, "closed leftover detail tabs");
            self.home.bring_to_front().await?;
        }
        *self.focused.lock().await = self.home.clone();
        Ok(closed)
    }

    async fn page_html(&self) -> Result<String> {
        let page = self.focused_page().await;
        let result = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to read page HTML")?;
        result
            .into_value()
            .map_err(|e| anyhow!("failed to convert HTML result: {e:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn session_navigates_and_reads_html() {
        let session = ChromiumSession::connect()
            .await
            .expect("failed to launch session");

        session
            .goto("data:text/html,<input id='busca'><ul><li><a href='#'>Porto Velho</a></li></ul>")
            .await
            .expect("navigation failed");

        assert!(session
            .wait_clickable("#busca", Duration::from_secs(5))
            .await
            .unwrap());

        let results = session
            .wait_search_results("Porto", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(results, ["Porto Velho"]);

        let html = session.page_html().await.unwrap();
        assert!(html.contains("Porto Velho"));

        assert_eq!(session.tab_count().await.unwrap(), 1);
        assert_eq!(session.close_extra_tabs().await.unwrap(), 0);

        session.shutdown().await.expect("shutdown failed");
    }
}
