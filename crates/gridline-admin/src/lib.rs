//! Bulk actions and spreadsheet export for gridline
//!
//! Works on top of a [`gridline_tables::TableView`]: takes the user's
//! selection and either exports the selected rows to XLSX or deletes them
//! from the backing store after an explicit confirmation.
//!
//! - **export**: [`SpreadsheetExporter`] builds one-sheet workbooks with typed
//!   currency, date and status cells
//! - **sink**: [`ArtifactSink`] delivers finished files
//! - **store**: [`RecordStore`] is the batched delete boundary
//! - **resolver**: [`TargetResolver`] maps page titles to collections
//! - **dispatcher**: [`BulkActionDispatcher`] runs the action state machine
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gridline_admin::{BulkAction, BulkActionDispatcher, DispatchOutcome, MemorySink, MemoryStore};
//! use gridline_core::{field_column, BoxedColumn, FieldMap};
//! use gridline_tables::SelectionSet;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryStore::new().with_rows("clientes", [1, 2]));
//! let dispatcher = BulkActionDispatcher::new(store.clone(), Arc::new(MemorySink::new()));
//!
//! let records = vec![FieldMap::new(1), FieldMap::new(2)];
//! let columns: Vec<BoxedColumn<FieldMap>> = vec![Box::new(field_column("nombre", "Nombre"))];
//! let mut selection: SelectionSet = [1].into_iter().map(Into::into).collect();
//!
//! let outcome = dispatcher
//!     .dispatch(BulkAction::DeleteSubset, &selection, &records, &columns, "Clientes")
//!     .await
//!     .unwrap();
//! let DispatchOutcome::ConfirmDelete(confirmation) = outcome else { unreachable!() };
//! dispatcher.confirm_delete(&confirmation, &mut selection).await.unwrap();
//!
//! assert!(selection.is_empty());
//! assert_eq!(store.len("clientes"), 1);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod dispatcher;
pub mod error;
pub mod export;
pub mod resolver;
pub mod sink;
pub mod store;

// Re-exports for convenience
pub use dispatcher::{
	BulkAction, BulkActionDispatcher, DataChangedHandler, DeleteConfirmation, DeleteReport,
	DispatchOutcome, DispatchPhase,
};
pub use error::{
	ActionError, ActionResult, ExportError, ExportResult, StoreError, StoreErrorKind,
};
pub use export::{ExportArtifact, ExportCell, SheetModel, SpreadsheetExporter, XLSX_MIME_TYPE};
pub use resolver::{Resolution, ResolutionPath, TargetResolver};
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
pub use store::{ItemStore, MemoryStore, RecordStore, SequentialDeleteStore};
