use chrono::NaiveDate;

use super::charts::{self, Bucket, CountryShare};
use super::filter::FilteredView;
use super::metrics::Metrics;

/// Knobs for the chart reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            histogram_bins: 20,
        }
    }
}

/// Everything one render pass needs, recomputed whenever a filter changes.
#[derive(Debug, Clone, Default)]
pub struct DashboardSummary {
    pub metrics: Metrics,
    pub time_series: Vec<(NaiveDate, f64)>,
    pub top_performers: Vec<(String, u64)>,
    pub histogram: Vec<Bucket>,
    pub country_share: Vec<CountryShare>,
    /// Table row indices, newest date first.
    pub rows_desc: Vec<usize>,
}

impl DashboardSummary {
    pub fn compute(view: &FilteredView<'_>, options: ChartOptions) -> Self {
        DashboardSummary {
            metrics: Metrics::compute(view),
            time_series: charts::time_series(view),
            top_performers: charts::top_performers(view, options.top_n),
            histogram: charts::amount_histogram(view, options.histogram_bins),
            country_share: charts::boxes_by_country(view),
            rows_desc: charts::rows_by_date_desc(view),
        }
    }
}
