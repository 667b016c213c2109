//! Data layer: core types, loading, and the filter-and-derive pipeline.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json / .parquet / remote URL
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (single-slot cache)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  apply criteria → filtered view
//!   └──────────┘
//!        │
//!        ├──────────────► export (csv / xlsx / pdf)
//!        ▼
//!   ┌──────────┐
//!   │   diff    │  deltas against one reference row
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  reshape  │  wide → long, ordered segments → chart
//!   └──────────┘
//! ```
pub mod diff;
pub mod filter;
pub mod loader;
pub mod model;
pub mod reshape;
