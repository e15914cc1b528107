/// Data layer: core types, catalog, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .xlsx sources
///        │
///        ▼
///   ┌──────────┐
///   │ catalog   │  load + rename → Table (bounded TTL cache)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  column projection + row predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  describe / trend / correlation → Report
///   └──────────┘
/// ```

pub mod catalog;
pub mod filter;
pub mod model;
pub mod stats;
