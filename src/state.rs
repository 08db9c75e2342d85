use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::color::ColorAssignment;
use crate::config::ChartConfig;
use crate::data::loader;
use crate::data::model::{BumpDataset, CountrySeries, Observation};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ChartConfig,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<BumpDataset>,

    /// Where the current dataset came from.
    pub source: Option<PathBuf>,

    /// Countries currently drawn.  Always a subset of the qualifying set.
    active: BTreeSet<String>,

    /// Country emphasised by the selector, if any.
    highlighted: Option<String>,

    /// Colours fixed at load time.
    pub colors: Option<ColorAssignment>,

    /// Observation under the pointer, shown in the tooltip.
    pub hovered: Option<Observation>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

impl AppState {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            dataset: None,
            source: None,
            active: BTreeSet::new(),
            highlighted: None,
            colors: None,
            hovered: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset: every country active, nothing highlighted.
    pub fn set_dataset(&mut self, dataset: BumpDataset) {
        self.active = dataset.countries.iter().cloned().collect();
        self.colors = Some(ColorAssignment::new(&dataset.countries));
        self.highlighted = None;
        self.hovered = None;
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Load `path`, replacing the current dataset.  On failure the chart is
    /// left empty and the error is kept as the status message.
    pub fn load_from_path(&mut self, path: &Path) -> bool {
        match loader::load_file(path, self.config.top_n) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} observations for {} countries across {} years from {}",
                    dataset.len(),
                    dataset.countries.len(),
                    dataset.years.len(),
                    path.display()
                );
                self.set_dataset(dataset);
                self.source = Some(path.to_path_buf());
                true
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.clear_dataset();
                self.status_message = Some(format!("Failed to load data: {e:#}"));
                false
            }
        }
    }

    fn clear_dataset(&mut self) {
        self.dataset = None;
        self.source = None;
        self.active.clear();
        self.highlighted = None;
        self.hovered = None;
        self.colors = None;
    }

    /// Qualifying countries in legend order.
    pub fn countries(&self) -> &[String] {
        self.dataset
            .as_ref()
            .map(|ds| ds.countries.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_active(&self, country: &str) -> bool {
        self.active.contains(country)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Flip a qualifying country in or out of the active set.
    ///
    /// Returns `false` (and changes nothing) for countries outside the
    /// qualifying set.
    pub fn toggle_country(&mut self, country: &str) -> bool {
        let qualifies = self
            .dataset
            .as_ref()
            .is_some_and(|ds| ds.contains(country));
        if !qualifies {
            log::warn!("Ignoring toggle of non-qualifying country {country:?}");
            return false;
        }
        if !self.active.remove(country) {
            self.active.insert(country.to_string());
        }
        log::debug!(
            "Toggled {country}: {} of {} active",
            self.active.len(),
            self.countries().len()
        );
        true
    }

    /// Highlight one qualifying country, or clear the highlight with `None`.
    ///
    /// Unknown countries are rejected and leave the highlight unchanged.
    pub fn set_highlight(&mut self, country: Option<&str>) -> bool {
        match country {
            None => {
                self.highlighted = None;
            }
            Some(c) if self.dataset.as_ref().is_some_and(|ds| ds.contains(c)) => {
                self.highlighted = Some(c.to_string());
            }
            Some(c) => {
                log::warn!("Ignoring highlight of non-qualifying country {c:?}");
                return false;
            }
        }
        log::debug!("Highlight set to {:?}", self.highlighted);
        true
    }

    /// Target opacity of a country's line and markers.
    pub fn opacity_for(&self, country: &str) -> f32 {
        match &self.highlighted {
            Some(h) if h != country => self.config.dim_opacity,
            _ => 1.0,
        }
    }

    /// Series of the active countries, filtered from the cached dataset.
    pub fn visible_series(&self) -> Vec<CountrySeries> {
        match &self.dataset {
            Some(ds) => ds.series(|c| self.active.contains(c)),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> BumpDataset {
        let rows = (0..n)
            .flat_map(|i| {
                [2012, 2016].map(|year| Observation::new(format!("C{i}"), year, i as i64 + 1, 0.0))
            })
            .collect();
        BumpDataset::from_observations(rows, 10).unwrap()
    }

    fn loaded(n: usize) -> AppState {
        let mut state = AppState::default();
        state.set_dataset(dataset(n));
        state
    }

    fn active(state: &AppState) -> Vec<String> {
        state
            .countries()
            .iter()
            .filter(|c| state.is_active(c))
            .cloned()
            .collect()
    }

    #[test]
    fn everything_starts_active() {
        let state = loaded(12);
        assert_eq!(state.countries().len(), 10);
        assert_eq!(state.active_count(), 10);
        assert_eq!(state.highlighted(), None);
        assert_eq!(state.colors.as_ref().map(|c| c.len()), Some(10));
    }

    #[test]
    fn double_toggle_restores_active_set() {
        let mut state = loaded(5);
        let before = active(&state);
        assert!(state.toggle_country("C2"));
        assert!(!state.is_active("C2"));
        assert_eq!(state.visible_series().len(), 4);
        assert!(state.toggle_country("C2"));
        assert_eq!(active(&state), before);
    }

    #[test]
    fn toggling_outside_the_qualifying_set_is_ignored() {
        let mut state = loaded(12);
        assert!(!state.toggle_country("C11"));
        assert!(!state.is_active("C11"));
        assert_eq!(state.active_count(), 10);
    }

    #[test]
    fn highlight_dims_everyone_else() {
        let mut state = loaded(3);
        assert!(state.set_highlight(Some("C1")));
        assert_eq!(state.opacity_for("C1"), 1.0);
        assert_eq!(state.opacity_for("C0"), 0.2);
        assert_eq!(state.opacity_for("C2"), 0.2);

        assert!(state.set_highlight(None));
        for c in ["C0", "C1", "C2"] {
            assert_eq!(state.opacity_for(c), 1.0);
        }
    }

    #[test]
    fn invalid_highlight_is_rejected() {
        let mut state = loaded(3);
        state.set_highlight(Some("C0"));
        assert!(!state.set_highlight(Some("Atlantis")));
        assert_eq!(state.highlighted(), Some("C0"));
    }

    #[test]
    fn new_dataset_resets_interaction_state() {
        let mut state = loaded(3);
        state.toggle_country("C0");
        state.set_highlight(Some("C1"));
        state.set_dataset(dataset(4));
        assert_eq!(state.active_count(), 4);
        assert_eq!(state.highlighted(), None);
    }

    #[test]
    fn failed_load_leaves_empty_chart_and_message() {
        let mut state = loaded(3);
        assert!(!state.load_from_path(Path::new("/nonexistent/bump_data.csv")));
        assert!(state.dataset.is_none());
        assert!(state.visible_series().is_empty());
        assert!(state.countries().is_empty());
        let msg = state.status_message.as_deref().unwrap_or_default();
        assert!(msg.starts_with("Failed to load data"));
    }
}
