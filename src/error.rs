//! Error taxonomies for the lookup and navigation layers.
//!
//! Only `LookupError` (and invalid operator input, handled at the CLI
//! layer) may abort a run. Every `NavigationError` is per-municipality:
//! the orchestrator absorbs it into a degraded all-absent row and moves
//! on to the next municipality.

use thiserror::Error;

/// Failure talking to the location lookup service.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The service did not respond, answered non-2xx, or returned a body
    /// that does not deserialize into the expected records.
    #[error("location lookup unavailable: {0}")]
    Unavailable(String),
}

/// Failure bringing the browser from the portal home page to a focused
/// municipality profile tab. One variant per state-machine step.
#[derive(Error, Debug)]
pub enum NavigationError {
    /// The side-menu trigger never became clickable on the home page.
    #[error("side-menu trigger did not become clickable")]
    MenuNotFound,

    /// The "Municípios" submenu entry never became clickable.
    #[error("municipalities submenu entry did not become clickable")]
    SubmenuNotFound,

    /// The search input never became interactive.
    #[error("search input did not become interactive")]
    SearchInputNotFound,

    /// No search result link matched the municipality name in time.
    #[error("no search result matched {name:?}")]
    ResultNotFound { name: String },

    /// More than one result link survived the selection policy; picking
    /// one would risk harvesting the wrong municipality's page.
    #[error("search results for {name:?} are ambiguous: {candidates:?}")]
    AmbiguousMatch {
        name: String,
        candidates: Vec<String>,
    },

    /// The result link was clicked but no second tab appeared, so there
    /// is no profile page to extract from.
    #[error("municipality profile page never opened in a second tab")]
    NoDetailPage,

    /// The browser session itself failed (launch lost, CDP error, ...).
    #[error(transparent)]
    Session(#[from] anyhow::Error),
}
