//! # gridline
//!
//! Table engine for back-office dashboards: derive a sorted, filtered,
//! paginated view of a record collection, keep a multi-record selection,
//! and run bulk export and delete actions against it.
//!
//! ## Feature Flags
//!
//! - `tables` - Table views (sorting, filtering, pagination, selection)
//! - `admin` - Bulk actions (XLSX export, confirmed delete)
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```rust
//! use gridline::prelude::*;
//!
//! let records = vec![
//!     FieldMap::new(1).with("monto", 300).with("fecha", "2024-01-05"),
//!     FieldMap::new(2).with("monto", 100).with("fecha", "2024-02-11"),
//!     FieldMap::new(3).with("monto", 200).with("fecha", "2024-01-20"),
//! ];
//! let mut view = TableView::new(records)
//!     .with_column(Box::new(field_column("monto", "Monto")))
//!     .with_filter_config(FilterConfig::new().date_field("fecha"));
//!
//! view.set_month_index(Some(0)).unwrap();
//! view.sort_by("monto").unwrap();
//!
//! let ids: Vec<_> = view.visible().iter().map(|r| r.id().to_string()).collect();
//! assert_eq!(ids, vec!["3", "1"]);
//! ```

#![warn(missing_docs)]

pub mod core;
#[cfg(feature = "admin")]
pub mod admin;
#[cfg(feature = "tables")]
pub mod tables;

// Re-export the types most pages touch
pub use gridline_core::{
	BaseColumn, BoxedColumn, Column, FieldMap, GridSettings, Record, RecordId, Value,
	field_column,
};
#[cfg(feature = "tables")]
pub use gridline_tables::{
	FilterConfig, FilterValues, SearchField, SearchInput, SelectionSet, SortConfig, SortOrder,
	TableError, TableView,
};
#[cfg(feature = "admin")]
pub use gridline_admin::{
	ActionError, BulkAction, BulkActionDispatcher, DispatchOutcome, SpreadsheetExporter,
};

/// Prelude for the common imports
pub mod prelude {
	pub use crate::{
		BaseColumn, BoxedColumn, Column, FieldMap, GridSettings, Record, RecordId, Value,
		field_column,
	};

	#[cfg(feature = "tables")]
	pub use crate::{
		FilterConfig, FilterValues, SearchField, SearchInput, SelectionSet, SortConfig,
		SortOrder, TableError, TableView,
	};

	#[cfg(feature = "admin")]
	pub use crate::{
		ActionError, BulkAction, BulkActionDispatcher, DispatchOutcome, SpreadsheetExporter,
	};
	#[cfg(feature = "admin")]
	pub use gridline_admin::{ArtifactSink, DeleteConfirmation, RecordStore};
}
