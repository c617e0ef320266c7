//! Batch harvesting: one row per municipality of the chosen state.
//!
//! Navigation failures never abort the batch — the municipality degrades
//! into an all-absent row so the output always carries one row per
//! listed municipality, in listing order. Only the upstream lookup can
//! fail the whole run, and only before any browser work starts.

use crate::error::{LookupError, NavigationError};
use crate::extract::{extract_indicators, IndicatorValues};
use crate::locations::{LocationDirectory, MunicipalityRecord};
use crate::navigation::NavigationController;
use crate::session::PortalSession;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn};

/// One output row. Absent fields render as the unavailability sentinel
/// when the table is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorRecord {
    pub municipality: String,
    pub last_census_population: Option<String>,
    pub estimated_population: Option<String>,
    pub density: Option<String>,
}

impl IndicatorRecord {
    fn from_values(municipality: &str, values: IndicatorValues) -> Self {
        Self {
            municipality: municipality.to_string(),
            last_census_population: values.last_census_population,
            estimated_population: values.estimated_population,
            density: values.density,
        }
    }

    /// The degraded row emitted when navigation or page retrieval fails.
    pub fn absent(municipality: &str) -> Self {
        Self::from_values(municipality, IndicatorValues::default())
    }

    pub fn is_degraded(&self) -> bool {
        self.last_census_population.is_none()
            || self.estimated_population.is_none()
            || self.density.is_none()
    }
}

/// The accumulated result of one harvest run.
pub type HarvestTable = Vec<IndicatorRecord>;

/// Drives the full batch for one state over a shared browser session.
pub struct HarvestOrchestrator<'a> {
    directory: &'a LocationDirectory,
    session: &'a dyn PortalSession,
    timeout: Duration,
    show_progress: bool,
}

impl<'a> HarvestOrchestrator<'a> {
    pub fn new(
        directory: &'a LocationDirectory,
        session: &'a dyn PortalSession,
        timeout: Duration,
    ) -> Self {
        Self {
            directory,
            session,
            timeout,
            show_progress: false,
        }
    }

    /// Render an indicatif bar over the municipality loop.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Collect indicators for every municipality of the state with the
    /// given abbreviation. Fails only when the municipality list itself
    /// cannot be obtained.
    pub async fn harvest(&self, abbreviation: &str) -> Result<HarvestTable, LookupError> {
        let municipalities = self.directory.list_municipalities(abbreviation).await?;
        info!(
            state = abbreviation,
            count = municipalities.len(),
            "starting harvest"
        );
        Ok(self.harvest_listed(&municipalities).await)
    }

    /// Collect indicators for an already-fetched municipality list.
    pub async fn harvest_listed(&self, municipalities: &[MunicipalityRecord]) -> HarvestTable {
        let nav = NavigationController::new(self.session, self.timeout);
        let bar = self.progress_bar(municipalities.len() as u64);
        let mut table = Vec::with_capacity(municipalities.len());

        for municipality in municipalities {
            bar.set_message(municipality.name.clone());
            table.push(self.harvest_one(&nav, &municipality.name).await);

            // Reconcile tab state before the next municipality: a failed
            // run may have left the detail tab open.
            if let Err(e) = self.session.close_extra_tabs().await {
                warn!(municipality = %municipality.name, error = %e, "tab cleanup failed");
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        table
    }

    async fn harvest_one(&self, nav: &NavigationController<'_>, name: &str) -> IndicatorRecord {
        match nav.open(name).await {
            Ok(()) => match self.session.page_html().await {
                Ok(html) => IndicatorRecord::from_values(name, extract_indicators(&html)),
                Err(e) => {
                    warn!(municipality = name, error = %e, "profile page unreadable, emitting degraded row");
                    IndicatorRecord::absent(name)
                }
            },
            Err(NavigationError::NoDetailPage) => {
                warn!(municipality = name, "profile page never opened, emitting degraded row");
                IndicatorRecord::absent(name)
            }
            Err(e) => {
                warn!(municipality = name, error = %e, "navigation failed, emitting degraded row");
                IndicatorRecord::absent(name)
            }
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_row_has_no_values() {
        let row = IndicatorRecord::absent("Xyz");
        assert_eq!(row.municipality, "Xyz");
        assert!(row.is_degraded());
        assert_eq!(row.last_census_population, None);
        assert_eq!(row.estimated_population, None);
        assert_eq!(row.density, None);
    }

    #[test]
    fn fully_populated_row_is_not_degraded() {
        let row = IndicatorRecord::from_values(
            "Porto Velho",
            IndicatorValues {
                last_census_population: Some("548.952".into()),
                estimated_population: Some("539.354".into()),
                density: Some("6.59".into()),
            },
        );
        assert!(!row.is_degraded());
    }
}
