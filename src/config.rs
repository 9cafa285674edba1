use std::path::PathBuf;

use clap::Parser;

use crate::data::summary::ChartOptions;

/// Command line for the dashboard window.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(about = "Chocolate sales dashboard: filter, summarise and chart a sales file")]
pub struct DashboardConfig {
    /// Sales file to open at startup (.csv, .json or .parquet).
    #[arg(env = "CHOCOLATE_SALES_DATA", default_value = "Chocolate_Sales.csv")]
    pub data: PathBuf,

    /// How many sales people the top-performers chart shows.
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Number of buckets in the amount histogram.
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..))]
    pub bins: u16,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1400.0)]
    pub width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}

impl DashboardConfig {
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            top_n: self.top_n,
            histogram_bins: usize::from(self.bins),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DashboardConfig::try_parse_from(["chocolate-sales", "sales.csv"]).unwrap();
        assert_eq!(cfg.data, PathBuf::from("sales.csv"));
        assert_eq!(cfg.chart_options(), ChartOptions::default());
        assert_eq!(cfg.width, 1400.0);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = DashboardConfig::try_parse_from([
            "chocolate-sales",
            "other.parquet",
            "--top-n",
            "5",
            "--bins",
            "8",
        ])
        .unwrap();
        assert_eq!(
            cfg.chart_options(),
            ChartOptions {
                top_n: 5,
                histogram_bins: 8
            }
        );
    }

    #[test]
    fn zero_bins_is_rejected() {
        assert!(DashboardConfig::try_parse_from(["chocolate-sales", "a.csv", "--bins", "0"]).is_err());
    }
}
