//! Error types for table views

use thiserror::Error;

/// Errors raised by table view operations
///
/// Every variant leaves the view exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
	/// Requested page size is zero or above the configured maximum
	#[error("Page size {size} is outside 1..={max}")]
	InvalidPageSize {
		/// Requested size
		size: usize,
		/// Largest allowed size
		max: usize,
	},

	/// Requested page does not exist
	#[error("Page {requested} is out of range (1..={total_pages})")]
	PageOutOfRange {
		/// Requested page number (1-based)
		requested: usize,
		/// Number of pages currently available
		total_pages: usize,
	},

	/// Year or month filter set on a view without a date field
	#[error("No date field is configured for year/month filtering")]
	NoDateField,

	/// Month index outside 0..=11
	#[error("Month index {0} is out of range (0..=11)")]
	InvalidMonth(u32),

	/// Search value for a field the configuration does not declare
	#[error("Unknown search field '{0}'")]
	UnknownSearchField(String),

	/// Search value of the wrong kind for the declared field
	#[error("Search field '{field}' expects {expected} input")]
	SearchKindMismatch {
		/// Search field name
		field: String,
		/// Kind of input the field accepts
		expected: &'static str,
	},

	/// Date range whose lower bound is after its upper bound
	#[error("Date range for '{0}' starts after it ends")]
	InvertedRange(String),

	/// Value for an enumerated filter the configuration does not declare
	#[error("Unknown choice filter '{0}'")]
	UnknownChoiceFilter(String),

	/// Value outside an enumerated filter's options
	#[error("'{value}' is not an option of choice filter '{field}'")]
	InvalidChoice {
		/// Filter field
		field: String,
		/// Rejected value
		value: String,
	},

	/// Sort requested on a column marked as not sortable
	#[error("Column '{0}' is not sortable")]
	NotSortable(String),
}

/// Result type for table view operations
pub type Result<T> = std::result::Result<T, TableError>;
