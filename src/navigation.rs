//! The search → select → new-tab navigation state machine.
//!
//! One `open` call per municipality: drive the browser from the portal
//! home page to a focused tab showing that municipality's profile page,
//! or fail with a typed error and leave the browser reusable. Every wait
//! is a single bounded poll; no step retries itself.

use crate::error::NavigationError;
use crate::session::PortalSession;
use std::time::Duration;
use tracing::debug;

/// The fixed portal entry point.
pub const PORTAL_URL: &str = "https://cidades.ibge.gov.br/";

/// Side-menu trigger on the home page.
pub const MENU_TRIGGER: &str = "#abaMenuLateral";
/// "Municípios" entry inside the side menu.
pub const MUNICIPALITIES_ENTRY: &str = "#menu__municipio";
/// Municipality search input.
pub const SEARCH_INPUT: &str = "#busca";

/// Drives one municipality's navigation over a shared session handle.
pub struct NavigationController<'a> {
    session: &'a dyn PortalSession,
    timeout: Duration,
}

impl<'a> NavigationController<'a> {
    pub fn new(session: &'a dyn PortalSession, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    /// Bring the browser from idle-on-home to focused-on-profile for
    /// `name`. On error the caller is expected to reconcile tab state
    /// before the next municipality.
    pub async fn open(&self, name: &str) -> Result<(), NavigationError> {
        // HomeLoaded
        self.session.goto(PORTAL_URL).await?;
        if !self.session.wait_clickable(MENU_TRIGGER, self.timeout).await? {
            return Err(NavigationError::MenuNotFound);
        }

        // MenuOpen
        self.session.click(MENU_TRIGGER).await?;
        if !self
            .session
            .wait_clickable(MUNICIPALITIES_ENTRY, self.timeout)
            .await?
        {
            return Err(NavigationError::SubmenuNotFound);
        }

        // SearchReady
        self.session.click(MUNICIPALITIES_ENTRY).await?;
        if !self.session.wait_clickable(SEARCH_INPUT, self.timeout).await? {
            return Err(NavigationError::SearchInputNotFound);
        }
        self.session.clear_and_type(SEARCH_INPUT, name).await?;

        // ResultSelected
        let candidates = self.session.wait_search_results(name, self.timeout).await?;
        let target = select_result(name, &candidates)?;
        debug!(municipality = name, result = %target, "selecting search result");
        if !self.session.click_result_link(&target).await? {
            return Err(NavigationError::ResultNotFound {
                name: name.to_string(),
            });
        }

        // TabSwitched — the profile opens in a second tab.
        if !self.session.wait_tab_count(2, self.timeout).await? {
            return Err(NavigationError::NoDetailPage);
        }
        self.session.focus_tab(1).await?;

        // Ready
        Ok(())
    }
}

/// Pick the result link to follow for `name` from the candidate texts.
///
/// Exact text match wins; only when no candidate matches exactly does
/// substring containment apply. More than one survivor under the applied
/// policy is ambiguous — picking the first would risk harvesting a
/// municipality whose name merely contains this one.
fn select_result(name: &str, candidates: &[String]) -> Result<String, NavigationError> {
    if candidates.is_empty() {
        return Err(NavigationError::ResultNotFound {
            name: name.to_string(),
        });
    }

    let exact: Vec<&String> = candidates.iter().filter(|c| c.trim() == name).collect();
    match exact.len() {
        1 => return Ok(exact[0].clone()),
        0 => {}
        _ => {
            return Err(NavigationError::AmbiguousMatch {
                name: name.to_string(),
                candidates: exact.into_iter().cloned().collect(),
            })
        }
    }

    let containing: Vec<&String> = candidates.iter().filter(|c| c.contains(name)).collect();
    match containing.len() {
        1 => Ok(containing[0].clone()),
        0 => Err(NavigationError::ResultNotFound {
            name: name.to_string(),
        }),
        _ => Err(NavigationError::AmbiguousMatch {
            name: name.to_string(),
            candidates: containing.into_iter().cloned().collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_wins_over_substring() {
        let candidates = texts(&["Campo Grande", "Campo Grande do Sul"]);
        let picked = select_result("Campo Grande", &candidates).unwrap();
        assert_eq!(picked, "Campo Grande");
    }

    #[test]
    fn single_substring_match_is_accepted() {
        let candidates = texts(&["Porto Velho (RO)"]);
        let picked = select_result("Porto Velho", &candidates).unwrap();
        assert_eq!(picked, "Porto Velho (RO)");
    }

    #[test]
    fn multiple_substring_matches_are_ambiguous() {
        let candidates = texts(&["Boa Vista do Sul", "Boa Vista das Missões"]);
        let err = select_result("Boa Vista", &candidates).unwrap_err();
        assert!(matches!(err, NavigationError::AmbiguousMatch { .. }));
    }

    #[test]
    fn no_candidates_is_result_not_found() {
        let err = select_result("Xyz", &[]).unwrap_err();
        assert!(matches!(err, NavigationError::ResultNotFound { .. }));
    }

    #[test]
    fn unrelated_candidates_are_result_not_found() {
        let candidates = texts(&["Manaus", "Belém"]);
        let err = select_result("Xyz", &candidates).unwrap_err();
        assert!(matches!(err, NavigationError::ResultNotFound { .. }));
    }
}
