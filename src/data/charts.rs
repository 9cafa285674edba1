//! Chart-ready reductions over a filtered view.
//!
//! Each function is pure: the same view always produces the same table.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::filter::FilteredView;

/// One histogram bucket: `[lower, upper)`, the last bucket closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl Bucket {
    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// A country's boxes and its proportion of the view's total.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShare {
    pub country: String,
    pub boxes: u64,
    pub share: f64,
}

/// Sales over time: total amount per date, ascending by date.
pub fn time_series(view: &FilteredView<'_>) -> Vec<(NaiveDate, f64)> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for rec in view.iter() {
        *by_date.entry(rec.date).or_default() += rec.amount;
    }
    by_date.into_iter().collect()
}

/// Sales people ranked by boxes shipped, at most `n` of them.
///
/// Equal totals are ordered by name.
pub fn top_performers(view: &FilteredView<'_>, n: usize) -> Vec<(String, u64)> {
    let mut by_person: BTreeMap<&str, u64> = BTreeMap::new();
    for rec in view.iter() {
        *by_person.entry(rec.sales_person.as_str()).or_default() += rec.boxes_shipped;
    }
    let mut ranked: Vec<(String, u64)> = by_person
        .into_iter()
        .map(|(person, boxes)| (person.to_string(), boxes))
        .collect();
    // BTreeMap order is by name, and the sort is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Equal-width histogram of the raw amounts.
pub fn amount_histogram(view: &FilteredView<'_>, bins: usize) -> Vec<Bucket> {
    if view.is_empty() {
        return Vec::new();
    }
    let amounts: Vec<f64> = view.iter().map(|r| r.amount).collect();
    let min = amounts.iter().copied().fold(f64::INFINITY, f64::min);
    let max = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let bins = bins.max(1);
    let range = max - min;
    if range <= 0.0 {
        return vec![Bucket {
            lower: min,
            upper: max,
            count: amounts.len(),
        }];
    }

    let width = range / bins as f64;
    let mut buckets: Vec<Bucket> = (0..bins)
        .map(|i| Bucket {
            lower: min + i as f64 * width,
            upper: if i + 1 == bins {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();
    for v in amounts {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        buckets[idx].count += 1;
    }
    buckets
}

/// Boxes shipped per country, sorted by country name.
pub fn boxes_by_country(view: &FilteredView<'_>) -> Vec<CountryShare> {
    let mut by_country: BTreeMap<&str, u64> = BTreeMap::new();
    for rec in view.iter() {
        *by_country.entry(rec.country.as_str()).or_default() += rec.boxes_shipped;
    }
    let total: u64 = by_country.values().sum();
    by_country
        .into_iter()
        .map(|(country, boxes)| CountryShare {
            country: country.to_string(),
            boxes,
            share: if total == 0 {
                0.0
            } else {
                boxes as f64 / total as f64
            },
        })
        .collect()
}

/// Table indices of the view's rows, newest first. Rows sharing a date
/// keep table order.
pub fn rows_by_date_desc(view: &FilteredView<'_>) -> Vec<usize> {
    let records = &view.table().records;
    let mut rows = view.indices().to_vec();
    rows.sort_by_key(|&i| Reverse(records[i].date));
    rows
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::data::filter::{apply, FilterParams};
    use crate::data::metrics::Metrics;
    use crate::data::model::tests::{record, scenario_table};
    use crate::data::model::SalesTable;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn everything(table: &SalesTable, product: &str) -> FilterParams {
        let mut p = FilterParams::defaults_for(table).unwrap();
        p.product = product.to_string();
        p
    }

    #[test]
    fn scenario_product_x() {
        let table = scenario_table();
        let view = apply(&table, &everything(&table, "X"));

        assert_eq!(
            time_series(&view),
            vec![(date(2023, 1, 1), 10.0), (date(2023, 1, 2), 20.0)]
        );
        assert_eq!(
            top_performers(&view, 10),
            vec![("A".to_string(), 5), ("B".to_string(), 3)]
        );
        assert_eq!(
            boxes_by_country(&view),
            vec![CountryShare {
                country: "US".to_string(),
                boxes: 8,
                share: 1.0
            }]
        );
        let rows: Vec<_> = rows_by_date_desc(&view)
            .into_iter()
            .map(|i| table.records[i].sales_person.as_str())
            .collect();
        assert_eq!(rows, vec!["B", "A"]);
    }

    #[test]
    fn scenario_product_y_single_row() {
        let table = scenario_table();
        let view = apply(&table, &everything(&table, "Y"));
        assert_eq!(time_series(&view), vec![(date(2023, 1, 3), 5.0)]);
        assert_eq!(top_performers(&view, 10), vec![("C".to_string(), 1)]);
        assert_eq!(
            amount_histogram(&view, 20),
            vec![Bucket {
                lower: 5.0,
                upper: 5.0,
                count: 1
            }]
        );
    }

    #[test]
    fn excluded_dates_give_empty_charts() {
        let table = scenario_table();
        let mut p = everything(&table, "X");
        p.date_start = date(2022, 1, 1);
        p.date_end = date(2022, 12, 31);
        let view = apply(&table, &p);
        assert!(time_series(&view).is_empty());
        assert!(top_performers(&view, 10).is_empty());
        assert!(amount_histogram(&view, 20).is_empty());
        assert!(boxes_by_country(&view).is_empty());
        assert!(rows_by_date_desc(&view).is_empty());
    }

    #[test]
    fn histogram_places_max_in_last_bucket() {
        let table = SalesTable::from_records(vec![
            record((2023, 1, 1), "A", "US", "X", 0.0, 1),
            record((2023, 1, 1), "A", "US", "X", 5.0, 1),
            record((2023, 1, 1), "A", "US", "X", 10.0, 1),
        ]);
        let view = apply(&table, &everything(&table, "X"));
        let buckets = amount_histogram(&view, 2);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].count, 2);
        assert_eq!(buckets[1].upper, 10.0);
        assert_eq!(buckets[0].width(), 5.0);
    }

    #[test]
    fn top_performers_caps_and_breaks_ties_by_name() {
        let records = (0..12)
            .map(|i| {
                let name = format!("P{i:02}");
                record((2023, 1, 1), &name, "US", "X", 1.0, (i / 2) as u64)
            })
            .collect();
        let table = SalesTable::from_records(records);
        let view = apply(&table, &everything(&table, "X"));
        let top = top_performers(&view, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], ("P10".to_string(), 5));
        assert_eq!(top[1], ("P11".to_string(), 5));
    }

    fn arb_table() -> impl Strategy<Value = SalesTable> {
        let row = (
            1u32..28,
            prop::sample::select((0..15).map(|i| format!("S{i}")).collect::<Vec<_>>()),
            prop::sample::select(vec!["US", "CA", "UK", "DE"]),
            0u32..100_000,
            0u64..1_000,
        );
        prop::collection::vec(row, 0..60).prop_map(|rows| {
            SalesTable::from_records(
                rows.into_iter()
                    .map(|(day, person, country, cents, boxes)| {
                        record((2023, 2, day), &person, country, "X", cents as f64 / 100.0, boxes)
                    })
                    .collect(),
            )
        })
    }

    proptest! {
        #[test]
        fn aggregate_properties(table in arb_table()) {
            let Some(params) = FilterParams::defaults_for(&table) else {
                return Ok(());
            };
            let view = apply(&table, &params);
            let metrics = Metrics::compute(&view);

            let country_boxes: u64 = boxes_by_country(&view).iter().map(|c| c.boxes).sum();
            prop_assert_eq!(country_boxes, metrics.boxes_total);

            let top = top_performers(&view, 10);
            prop_assert!(top.len() <= 10);
            prop_assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
            if metrics.people <= 10 {
                prop_assert_eq!(top.len(), metrics.people);
            }

            let series = time_series(&view);
            prop_assert!(series.windows(2).all(|w| w[0].0 <= w[1].0));

            let counted: usize = amount_histogram(&view, 20).iter().map(|b| b.count).sum();
            prop_assert_eq!(counted, view.len());
        }
    }
}
