use chrono::NaiveDate;

use crate::analytics::attribution::AttributionMetric;
use crate::analytics::summary::CAMPAIGN_START;
use crate::data::filter::{filtered_indices, init_filter_state, FilterState};
use crate::data::model::{Dataset, Value};
use crate::data::LoadResult;

/// Categorical columns offered as filters on the EDA page.
pub const FILTER_COLUMNS: &[&str] = &["CAMPAIGN_GROUP", "PLATFORM", "GMV_CATEGORY", "COUNTRY"];

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Eda,
    OutboundSizing,
    Attribution,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Eda, Page::OutboundSizing, Page::Attribution];

    pub fn title(self) -> &'static str {
        match self {
            Page::Eda => "EDA",
            Page::OutboundSizing => "Outbound Sizing",
            Page::Attribution => "Attribution Model",
        }
    }
}

/// The full UI state, independent of rendering. Datasets themselves live in
/// the load cache; this only records what the user picked.
#[derive(Debug, Default)]
pub struct AppState {
    pub page: Page,

    /// Dataset shown on the EDA page.
    pub selected_dataset: Option<String>,

    /// Per-column filter selections for the selected dataset.
    pub filters: FilterState,

    /// Inclusive campaign start window, when enabled.
    pub date_window: Option<(NaiveDate, NaiveDate)>,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Metric column charted for outbound campaigns.
    pub metric: Option<String>,

    pub attribution_metric: AttributionMetric,

    /// Source whose touchpoint funnel is shown.
    pub funnel_source: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

/// Dataset the EDA page opens on.
const DEFAULT_DATASET: &str = "outbound";

impl AppState {
    /// Make sure the EDA page points at a loaded dataset, preferring
    /// `outbound` and falling back to the first one by name.
    pub fn ensure_selection(&mut self, result: &LoadResult) {
        let current = self.selected_dataset.as_deref().and_then(|n| result.get(n));
        if current.is_some() {
            return;
        }
        let pick = result
            .get(DEFAULT_DATASET)
            .or_else(|| result.datasets.values().next());
        match pick {
            Some(ds) => self.select_dataset(ds),
            None => {
                self.selected_dataset = None;
                self.visible_indices.clear();
            }
        }
    }

    /// Switch the EDA page to a dataset, resetting filters and metric.
    pub fn select_dataset(&mut self, dataset: &Dataset) {
        self.selected_dataset = Some(dataset.name.clone());
        self.filters = init_filter_state(dataset, FILTER_COLUMNS);
        self.date_window = None;
        self.visible_indices = (0..dataset.len()).collect();
        self.metric = default_metric(dataset);
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self, dataset: &Dataset) {
        let mut indices = filtered_indices(dataset, &self.filters);
        if let (Some((from, to)), Some(col)) = (self.date_window, dataset.column_index(CAMPAIGN_START)) {
            indices.retain(|&i| {
                dataset.rows[i][col]
                    .as_date()
                    .is_some_and(|d| d >= from && d <= to)
            });
        }
        self.visible_indices = indices;
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, dataset: &Dataset, column: &str, value: &Value) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if selected.contains(value) {
            selected.remove(value);
        } else {
            selected.insert(value.clone());
        }
        self.refilter(dataset);
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, dataset: &Dataset, column: &str) {
        if let Some(all_vals) = dataset.unique_values().remove(column) {
            self.filters.insert(column.to_string(), all_vals);
            self.refilter(dataset);
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, dataset: &Dataset, column: &str) {
        self.filters.insert(column.to_string(), Default::default());
        self.refilter(dataset);
    }

    /// Enable the start-date window spanning the dataset's campaign dates.
    pub fn enable_date_window(&mut self, dataset: &Dataset) {
        let dates: Vec<NaiveDate> = dataset
            .column_values(CAMPAIGN_START)
            .map(|cells| cells.filter_map(Value::as_date).collect())
            .unwrap_or_default();
        if let (Some(from), Some(to)) = (dates.iter().min(), dates.iter().max()) {
            self.date_window = Some((*from, *to));
            self.refilter(dataset);
        }
    }

    pub fn disable_date_window(&mut self, dataset: &Dataset) {
        self.date_window = None;
        self.refilter(dataset);
    }
}

/// First numeric column other than identifiers.
fn default_metric(dataset: &Dataset) -> Option<String> {
    dataset
        .columns
        .iter()
        .enumerate()
        .find(|(idx, name)| {
            !name.ends_with("_ID")
                && dataset.rows.iter().any(|r| r[*idx].as_f64().is_some())
                && !dataset.is_text_column(*idx)
        })
        .map(|(_, name)| name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(2023, m, d).unwrap())
    }

    fn outbound() -> Dataset {
        Dataset::new(
            "outbound",
            vec!["CAMPAIGN_GROUP".into(), CAMPAIGN_START.into(), "NB_EMAILS".into()],
            vec![
                vec![Value::Text("Loom".into()), date(1, 1), Value::Integer(3)],
                vec![Value::Text("GA4".into()), date(2, 1), Value::Integer(5)],
                vec![Value::Text("Loom".into()), date(3, 1), Value::Null],
            ],
        )
    }

    #[test]
    fn selecting_a_dataset_resets_view() {
        let ds = outbound();
        let mut state = AppState::default();
        state.select_dataset(&ds);
        assert_eq!(state.selected_dataset.as_deref(), Some("outbound"));
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.metric.as_deref(), Some("NB_EMAILS"));
        assert!(state.filters.contains_key("CAMPAIGN_GROUP"));
    }

    #[test]
    fn ensure_selection_prefers_outbound() {
        let mut result = LoadResult::default();
        let other = Dataset::new("attribution_cjm", vec!["X".into()], vec![vec![Value::Integer(1)]]);
        result.datasets.insert(other.name.clone(), other);

        let mut state = AppState::default();
        state.ensure_selection(&result);
        assert_eq!(state.selected_dataset.as_deref(), Some("attribution_cjm"));

        result.datasets.insert("outbound".into(), outbound());
        state.selected_dataset = Some("gone".into());
        state.ensure_selection(&result);
        assert_eq!(state.selected_dataset.as_deref(), Some("outbound"));
        assert_eq!(state.visible_indices.len(), 3);

        state.ensure_selection(&LoadResult::default());
        assert!(state.selected_dataset.is_none());
    }

    #[test]
    fn toggling_values_refilters() {
        let ds = outbound();
        let mut state = AppState::default();
        state.select_dataset(&ds);
        state.toggle_filter_value(&ds, "CAMPAIGN_GROUP", &Value::Text("GA4".into()));
        assert_eq!(state.visible_indices, vec![0, 2]);
        state.select_none(&ds, "CAMPAIGN_GROUP");
        assert!(state.visible_indices.is_empty());
        state.select_all(&ds, "CAMPAIGN_GROUP");
        assert_eq!(state.visible_indices.len(), 3);
    }

    #[test]
    fn date_window_restricts_rows() {
        let ds = outbound();
        let mut state = AppState::default();
        state.select_dataset(&ds);
        state.enable_date_window(&ds);
        assert_eq!(state.visible_indices.len(), 3);

        let (from, _) = state.date_window.unwrap();
        state.date_window = Some((from, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()));
        state.refilter(&ds);
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.disable_date_window(&ds);
        assert_eq!(state.visible_indices.len(), 3);
    }
}
