use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{SalesRecord, SalesTable};

// ---------------------------------------------------------------------------
// Filter parameters: the current widget selections
// ---------------------------------------------------------------------------

/// Date range, country set and the single selected product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParams {
    /// Inclusive lower bound.
    pub date_start: NaiveDate,
    /// Inclusive upper bound.
    pub date_end: NaiveDate,
    /// Countries to keep. Empty means nothing passes.
    pub countries: BTreeSet<String>,
    pub product: String,
}

impl FilterParams {
    /// Widget defaults: the full date range, every country and the first
    /// product in sorted order. `None` for an empty table.
    pub fn defaults_for(table: &SalesTable) -> Option<Self> {
        let (date_start, date_end) = table.date_bounds?;
        let product = table.products.first()?.clone();
        Some(FilterParams {
            date_start,
            date_end,
            countries: table.countries.clone(),
            product,
        })
    }

    /// Keep both dates inside the table's bounds and in order.
    pub fn clamp_to(&mut self, table: &SalesTable) {
        if let Some((lo, hi)) = table.date_bounds {
            self.date_start = self.date_start.clamp(lo, hi);
            self.date_end = self.date_end.clamp(lo, hi);
        }
        if self.date_start > self.date_end {
            std::mem::swap(&mut self.date_start, &mut self.date_end);
        }
    }

    /// Whether a single record passes all four predicates.
    pub fn matches(&self, rec: &SalesRecord) -> bool {
        rec.date >= self.date_start
            && rec.date <= self.date_end
            && self.countries.contains(&rec.country)
            && rec.product == self.product
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Read-only subset of a table, in the table's row order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a SalesTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Wrap previously computed row indices.
    pub fn new(table: &'a SalesTable, indices: Vec<usize>) -> Self {
        FilteredView { table, indices }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records[i])
    }

    pub fn table(&self) -> &'a SalesTable {
        self.table
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return indices of records that pass every predicate in `params`.
pub fn filtered_indices(table: &SalesTable, params: &FilterParams) -> Vec<usize> {
    if params.countries.is_empty() {
        // Nothing selected → hide everything
        return Vec::new();
    }
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| params.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Build the filtered view for `params`.
pub fn apply<'a>(table: &'a SalesTable, params: &FilterParams) -> FilteredView<'a> {
    FilteredView::new(table, filtered_indices(table, params))
}
