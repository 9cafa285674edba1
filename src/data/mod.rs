/// Data layer: records, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────────┐
///   │ loader/cache │  parse file once → Arc<SalesTable>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range ∧ country set ∧ product → FilteredView
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ metrics  │   │  charts  │  distinct counts / sums, group-by tables
///   └──────────┘   └──────────┘
///        │              │
///        └──────┬───────┘
///               ▼
///        ┌─────────────┐
///        │   summary   │  one render pass worth of outputs
///        └─────────────┘
/// ```

pub mod cache;
pub mod charts;
pub mod export;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod summary;
