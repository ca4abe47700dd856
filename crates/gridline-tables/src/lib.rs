//! Table views for gridline
//!
//! This crate turns a record collection plus column descriptors into the rows a
//! dashboard table shows, and keeps the user's multi-record selection.
//!
//! # Features
//!
//! - **Sorting**: single-key, stable, nulls last in both directions
//! - **Filtering**: conjunctive year/month, text, exact-date, date-range and
//!   enumerated predicates
//! - **Pagination**: 1-based pages; out-of-range requests are rejected
//! - **Selection**: id-based, survives sorting, filtering and paging
//!
//! # Architecture
//!
//! ```text
//! TableView
//!  ├── FilterConfig + FilterValues ──► CompiledFilter
//!  ├── SortConfig
//!  ├── PaginationConfig ──► PageInfo
//!  └── SelectionSet
//! ```
//!
//! # Example
//!
//! ```rust
//! use gridline_core::FieldMap;
//! use gridline_tables::{FilterConfig, TableView};
//!
//! let records = vec![
//!     FieldMap::new(1).with("monto", 100).with("fecha", "2024-01-05"),
//!     FieldMap::new(2).with("monto", 200).with("fecha", "2024-02-10"),
//! ];
//! let mut view = TableView::new(records).with_filter_config(FilterConfig::new().date_field("fecha"));
//!
//! view.set_month_index(Some(0)).unwrap();
//! assert_eq!(view.filtered_len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod filter;
pub mod pagination;
pub mod selection;
pub mod sort;
pub mod table;

// Re-exports for convenience
pub use error::{Result, TableError};
pub use filter::{
	ChoiceFilter, ChoiceOption, CompiledFilter, FilterConfig, FilterValues, SearchField,
	SearchInput, SearchKind,
};
pub use pagination::{PageInfo, PaginationConfig};
pub use selection::SelectionSet;
pub use sort::{SortConfig, SortOrder};
pub use table::TableView;
