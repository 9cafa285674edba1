use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

/// Text format of the `date` column, day first.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

// ---------------------------------------------------------------------------
// SalesRecord – one row of the source file
// ---------------------------------------------------------------------------

/// A single sale transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub sales_person: String,
    pub country: String,
    pub product: String,
    /// Monetary value, never negative.
    pub amount: f64,
    pub boxes_shipped: u64,
}

impl fmt::Display for SalesRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {:.2} {}",
            self.date.format(DATE_FORMAT),
            self.sales_person,
            self.country,
            self.product,
            self.amount,
            self.boxes_shipped
        )
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed category indices.
///
/// Immutable once built; every derived view borrows from it.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    /// All records, in file order.
    pub records: Vec<SalesRecord>,
    /// Sorted distinct countries.
    pub countries: BTreeSet<String>,
    /// Sorted distinct products.
    pub products: BTreeSet<String>,
    /// Sorted distinct sales people.
    pub sales_people: BTreeSet<String>,
    /// Earliest and latest date, `None` for an empty table.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl SalesTable {
    /// Build category indices from the loaded records.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let mut countries = BTreeSet::new();
        let mut products = BTreeSet::new();
        let mut sales_people = BTreeSet::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            countries.insert(rec.country.clone());
            products.insert(rec.product.clone());
            sales_people.insert(rec.sales_person.clone());
            date_bounds = Some(match date_bounds {
                None => (rec.date, rec.date),
                Some((lo, hi)) => (lo.min(rec.date), hi.max(rec.date)),
            });
        }

        SalesTable {
            records,
            countries,
            products,
            sales_people,
            date_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
