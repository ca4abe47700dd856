//! Error types for bulk actions and exports

use gridline_core::RecordId;
use thiserror::Error;

/// Why a record store refused or failed a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreErrorKind {
	/// Other rows still reference the ones being deleted
	ReferentialIntegrity,
	/// Anything else
	Other,
}

/// Error reported by a [`RecordStore`](crate::store::RecordStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
	/// Classification
	pub kind: StoreErrorKind,
	/// Diagnostic text from the store
	pub message: String,
	/// Driver error code, if the store reports one (PostgreSQL SQLSTATE)
	pub code: Option<String>,
	/// Ids whose deletion failed, when the store can tell
	pub failed_ids: Vec<RecordId>,
}

/// PostgreSQL SQLSTATE for `foreign_key_violation`
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

impl StoreError {
	/// Build an error from a driver message and optional SQLSTATE, classifying it
	///
	/// # Examples
	///
	/// ```
	/// use gridline_admin::error::{StoreError, StoreErrorKind};
	///
	/// let err = StoreError::from_driver("update or delete on table \"clientes\" violates foreign key constraint", None);
	/// assert_eq!(err.kind, StoreErrorKind::ReferentialIntegrity);
	///
	/// let err = StoreError::from_driver("connection reset", None);
	/// assert_eq!(err.kind, StoreErrorKind::Other);
	/// ```
	pub fn from_driver(message: impl Into<String>, code: Option<&str>) -> Self {
		let message = message.into();
		let kind = classify(&message, code);
		Self {
			kind,
			message,
			code: code.map(str::to_string),
			failed_ids: Vec::new(),
		}
	}

	/// A referential-integrity failure
	pub fn referential(message: impl Into<String>) -> Self {
		Self {
			kind: StoreErrorKind::ReferentialIntegrity,
			message: message.into(),
			code: Some(FOREIGN_KEY_VIOLATION.to_string()),
			failed_ids: Vec::new(),
		}
	}

	/// An unclassified failure
	pub fn other(message: impl Into<String>) -> Self {
		Self {
			kind: StoreErrorKind::Other,
			message: message.into(),
			code: None,
			failed_ids: Vec::new(),
		}
	}

	/// Attach the ids that failed
	pub fn with_failed_ids(mut self, ids: Vec<RecordId>) -> Self {
		self.failed_ids = ids;
		self
	}

	/// Whether this is a referential-integrity failure
	pub fn is_referential(&self) -> bool {
		self.kind == StoreErrorKind::ReferentialIntegrity
	}
}

fn classify(message: &str, code: Option<&str>) -> StoreErrorKind {
	if code == Some(FOREIGN_KEY_VIOLATION) {
		return StoreErrorKind::ReferentialIntegrity;
	}
	let lower = message.to_lowercase();
	if lower.contains("foreign key")
		|| lower.contains("violates reference")
		|| lower.contains("reference constraint")
		|| lower.contains("is still referenced")
	{
		StoreErrorKind::ReferentialIntegrity
	} else {
		StoreErrorKind::Other
	}
}

/// Spreadsheet export error
///
/// Any of these aborts the export; no partial file is delivered.
#[derive(Debug, Error)]
pub enum ExportError {
	/// Every column was excluded from the export
	#[error("No exportable columns")]
	NoColumns,

	/// Workbook serialization failed
	#[error("Failed to build spreadsheet: {0}")]
	Workbook(#[from] rust_xlsxwriter::XlsxError),

	/// Artifact delivery failed
	#[error("Failed to deliver export '{filename}': {source}")]
	Delivery {
		/// File that could not be delivered
		filename: String,
		/// Underlying I/O failure
		#[source]
		source: std::io::Error,
	},
}

/// Bulk action error
#[derive(Debug, Error)]
pub enum ActionError {
	/// Another action is still running
	#[error("Another bulk action is already in progress")]
	Busy,

	/// The selection contains nothing to act on
	#[error("No records selected")]
	EmptySelection,

	/// No collection could be derived from the page title
	#[error("Cannot determine which collection '{0}' refers to")]
	UnresolvedTarget(String),

	/// Confirmation does not match the pending request
	#[error("No pending confirmation matches this request")]
	NotConfirming,

	/// Deletion blocked by records that reference the selection
	#[error(
		"Cannot delete the selected records from '{collection}' because other records depend on them"
	)]
	ReferentialIntegrity {
		/// Target collection
		collection: String,
		/// Store diagnostic
		source: StoreError,
	},

	/// Deletion failed for another reason
	#[error("Failed to delete records from '{collection}': {source}")]
	DeleteFailed {
		/// Target collection
		collection: String,
		/// Store diagnostic
		source: StoreError,
	},

	/// Export failed
	#[error(transparent)]
	Export(#[from] ExportError),
}

impl ActionError {
	/// Wrap a store failure into the matching user-facing class
	pub fn from_store(collection: impl Into<String>, source: StoreError) -> Self {
		let collection = collection.into();
		if source.is_referential() {
			ActionError::ReferentialIntegrity { collection, source }
		} else {
			ActionError::DeleteFailed { collection, source }
		}
	}
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for bulk actions
pub type ActionResult<T> = Result<T, ActionError>;
