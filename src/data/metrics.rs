use std::collections::BTreeSet;

use super::filter::FilteredView;

/// The five headline numbers shown above the charts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub people: usize,
    pub countries: usize,
    pub products: usize,
    pub sales_total: f64,
    pub boxes_total: u64,
}

impl Metrics {
    /// Distinct counts and sums over a filtered view. All zero when empty.
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let mut people = BTreeSet::new();
        let mut countries = BTreeSet::new();
        let mut products = BTreeSet::new();
        let mut sales_total = 0.0;
        let mut boxes_total = 0u64;

        for rec in view.iter() {
            people.insert(rec.sales_person.as_str());
            countries.insert(rec.country.as_str());
            products.insert(rec.product.as_str());
            sales_total += rec.amount;
            boxes_total += rec.boxes_shipped;
        }

        Metrics {
            people: people.len(),
            countries: countries.len(),
            products: products.len(),
            sales_total,
            boxes_total,
        }
    }
}

// ---------------------------------------------------------------------------
// Display formatting
// ---------------------------------------------------------------------------

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// `1234.5` → `"$1,234.50"`.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${}.{frac}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::{apply, FilterParams};
    use crate::data::model::tests::scenario_table;

    fn all_dates(product: &str) -> FilterParams {
        FilterParams {
            date_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            date_end: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            countries: ["US", "CA"].iter().map(|c| c.to_string()).collect(),
            product: product.to_string(),
        }
    }

    #[test]
    fn product_x_metrics() {
        let table = scenario_table();
        let m = Metrics::compute(&apply(&table, &all_dates("X")));
        assert_eq!(m.people, 2);
        assert_eq!(m.countries, 1);
        assert_eq!(m.products, 1);
        assert!((m.sales_total - 30.0).abs() < 1e-9);
        assert_eq!(m.boxes_total, 8);
    }

    #[test]
    fn single_row_metrics_equal_the_row() {
        let table = scenario_table();
        let m = Metrics::compute(&apply(&table, &all_dates("Y")));
        assert_eq!(m.people, 1);
        assert_eq!(m.countries, 1);
        assert_eq!(m.sales_total, 5.0);
        assert_eq!(m.boxes_total, 1);
    }

    #[test]
    fn empty_view_is_all_zero() {
        let table = scenario_table();
        let mut p = all_dates("X");
        p.date_start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        p.date_end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(Metrics::compute(&apply(&table, &p)), Metrics::default());
    }

    #[test]
    fn formatting() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(30.0), "$30.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
    }
}
