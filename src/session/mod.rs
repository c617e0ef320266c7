//! Browser session abstraction.
//!
//! `PortalSession` is the seam between the navigation logic and the
//! browser engine: the session is passed around as an explicit handle,
//! never held as ambient global state, so navigation and harvesting can
//! run against a scripted double in tests. The only real implementation
//! is `ChromiumSession` (chromiumoxide).
//!
//! Bounded waits return `Ok(false)` (or an empty list) on timeout and
//! `Err` only when the session itself is broken; callers turn timeouts
//! into their own typed errors.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A live browser session on the statistics portal.
#[async_trait]
pub trait PortalSession: Send + Sync {
    /// Navigate the home tab to `url` and wait for the load to settle.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Poll until the element at `css` is present and clickable.
    /// `Ok(false)` if the bound elapses first.
    async fn wait_clickable(&self, css: &str, timeout: Duration) -> Result<bool>;

    /// Simulated pointer click on the element at `css`.
    async fn click(&self, css: &str) -> Result<()>;

    /// Clear any residual text in the input at `css`, then type `text`.
    async fn clear_and_type(&self, css: &str, text: &str) -> Result<()>;

    /// Poll until at least one search-result link whose visible text
    /// contains `text` exists; return the matching link texts (trimmed).
    /// Empty on timeout.
    async fn wait_search_results(&self, text: &str, timeout: Duration) -> Result<Vec<String>>;

    /// Click the result link whose visible text equals `text` via direct
    /// DOM invocation (the link may sit outside the interactive
    /// viewport, so no pointer simulation). `Ok(false)` if the link is
    /// no longer present.
    async fn click_result_link(&self, text: &str) -> Result<bool>;

    /// Number of open tabs.
    async fn tab_count(&self) -> Result<usize>;

    /// Poll until exactly `n` tabs are open. `Ok(false)` on timeout.
    async fn wait_tab_count(&self, n: usize, timeout: Duration) -> Result<bool>;

    /// Shift input focus to the tab at `index` (0 = home tab).
    async fn focus_tab(&self, index: usize) -> Result<()>;

    /// Close every tab except the home tab and refocus it.
    /// Returns how many tabs were closed.
    async fn close_extra_tabs(&self) -> Result<usize>;

    /// Outer HTML of the focused tab's document.
    async fn page_html(&self) -> Result<String>;
}
