use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::cache::load_cached;
use crate::data::export::{export_csv, export_json};
use crate::data::filter::{self, FilterParams};
use crate::data::model::SalesTable;
use crate::data::summary::{ChartOptions, DashboardSummary};

/// Output formats offered by File → Export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (shared with the process-wide cache).
    pub table: Option<Arc<SalesTable>>,

    /// Where `table` came from.
    pub source: Option<PathBuf>,

    /// Current widget selections. `None` when the table is empty.
    pub filters: Option<FilterParams>,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Metrics and chart tables for the visible records.
    pub summary: DashboardSummary,

    pub chart_options: ChartOptions,

    /// Pie slice colours, one per country in the table.
    pub country_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(chart_options: ChartOptions) -> Self {
        Self {
            table: None,
            source: None,
            filters: None,
            visible_indices: Vec::new(),
            summary: DashboardSummary::default(),
            chart_options,
            country_colors: ColorMap::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded table, reset filters to their defaults.
    pub fn set_table(&mut self, source: PathBuf, table: Arc<SalesTable>) {
        self.filters = FilterParams::defaults_for(&table);
        self.country_colors = ColorMap::new(&table.countries);
        self.table = Some(table);
        self.source = Some(source);
        self.status_message = None;
        self.refilter();
    }

    /// Load `path` (through the cache) and make it the current table.
    ///
    /// On failure the current table stays and the error becomes the status.
    pub fn open_path(&mut self, path: &Path) {
        match load_cached(path) {
            Ok(table) => self.set_table(path.to_path_buf(), table),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute the filtered view and every aggregate after a filter change.
    pub fn refilter(&mut self) {
        let (Some(table), Some(params)) = (&self.table, &self.filters) else {
            self.visible_indices.clear();
            self.summary = DashboardSummary::default();
            return;
        };
        let view = filter::apply(table, params);
        log::debug!(
            "Filter {:?} keeps {} of {} records",
            params,
            view.len(),
            table.len()
        );
        self.summary = DashboardSummary::compute(&view, self.chart_options);
        self.visible_indices = view.into_indices();
    }

    /// Set the date range; the range is clamped to the data and ordered.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let (Some(table), Some(params)) = (&self.table, &mut self.filters) else {
            return;
        };
        params.date_start = start;
        params.date_end = end;
        params.clamp_to(table);
        self.refilter();
    }

    /// Toggle a single country in the multi-select.
    pub fn toggle_country(&mut self, country: &str) {
        let Some(params) = &mut self.filters else {
            return;
        };
        if !params.countries.remove(country) {
            params.countries.insert(country.to_string());
        }
        self.refilter();
    }

    /// Select every country in the table.
    pub fn select_all_countries(&mut self) {
        if let (Some(table), Some(params)) = (&self.table, &mut self.filters) {
            params.countries = table.countries.clone();
            self.refilter();
        }
    }

    /// Deselect all countries.
    pub fn select_no_countries(&mut self) {
        if let Some(params) = &mut self.filters {
            params.countries.clear();
            self.refilter();
        }
    }

    pub fn set_product(&mut self, product: &str) {
        if let Some(params) = &mut self.filters {
            if params.product != product {
                params.product = product.to_string();
                self.refilter();
            }
        }
    }

    /// Write the visible rows, newest first, to `path`.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let Some(table) = &self.table else {
            anyhow::bail!("no table loaded");
        };
        match format {
            ExportFormat::Csv => export_csv(path, table, &self.summary.rows_desc),
            ExportFormat::Json => export_json(path, table, &self.summary.rows_desc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::scenario_table;

    fn loaded() -> AppState {
        let mut state = AppState::new(ChartOptions::default());
        state.set_table(PathBuf::from("scenario.csv"), Arc::new(scenario_table()));
        state
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn loading_applies_default_filters() {
        let state = loaded();
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.summary.metrics.boxes_total, 8);
        assert_eq!(state.summary.rows_desc, vec![1, 0]);
    }

    #[test]
    fn product_switch_recomputes() {
        let mut state = loaded();
        state.set_product("Y");
        assert_eq!(state.visible_indices, vec![2]);
        assert_eq!(state.summary.top_performers.len(), 1);
    }

    #[test]
    fn country_toggles() {
        let mut state = loaded();
        state.toggle_country("US");
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.summary.metrics.sales_total, 0.0);
        state.toggle_country("US");
        assert_eq!(state.visible_indices.len(), 2);
        state.select_no_countries();
        assert!(state.visible_indices.is_empty());
        state.select_all_countries();
        assert_eq!(state.visible_indices.len(), 2);
    }

    #[test]
    fn date_range_is_clamped() {
        let mut state = loaded();
        state.set_date_range(date(2023, 1, 2), date(2030, 1, 1));
        let params = state.filters.as_ref().unwrap();
        assert_eq!(params.date_end, date(2023, 1, 3));
        assert_eq!(state.visible_indices, vec![1]);
    }

    #[test]
    fn failed_open_keeps_current_table() {
        let mut state = loaded();
        let dir = tempfile::tempdir().unwrap();
        state.open_path(&dir.path().join("missing.csv"));
        assert!(state.status_message.is_some());
        assert_eq!(state.table.as_ref().map(|t| t.len()), Some(3));
    }

    #[test]
    fn export_writes_visible_rows() {
        let state = loaded();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visible.csv");
        state.export(&path, ExportFormat::Csv).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with("02/01/2023,B"));
    }
}
