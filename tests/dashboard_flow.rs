//! End-to-end dashboard flow through the facade crate
//!
//! Filter, sort, page, select, export the selection, then delete it.

use gridline::admin::{MemorySink, MemoryStore};
use gridline::prelude::*;
use rstest::*;
use std::sync::Arc;

#[fixture]
fn ingresos() -> Vec<FieldMap> {
	(1..=30)
		.map(|i| {
			FieldMap::new(i)
				.with("concepto", if i % 3 == 0 { "Flete" } else { "Renta" })
				.with("monto", i * 100)
				.with("fecha", format!("2024-{:02}-15", (i - 1) % 6 + 1))
		})
		.collect()
}

#[rstest]
#[tokio::test]
async fn test_filter_sort_select_export_delete(ingresos: Vec<FieldMap>) {
	// Arrange
	let store = Arc::new(MemoryStore::new().with_rows("ingresos", 1..=30));
	let sink = Arc::new(MemorySink::new());
	let dispatcher = BulkActionDispatcher::new(store.clone(), sink.clone()).with_exporter(
		SpreadsheetExporter::new(GridSettings::default().export)
			.with_date(chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()),
	);
	let columns: Vec<BoxedColumn<FieldMap>> = vec![
		Box::new(field_column("concepto", "Concepto")),
		Box::new(field_column("monto", "Monto")),
		Box::new(field_column("fecha", "Fecha")),
	];
	let mut view = TableView::new(ingresos)
		.with_columns(columns)
		.with_filter_config(
			FilterConfig::new()
				.date_field("fecha")
				.search(SearchField::text("concepto", "Concepto")),
		);

	// Act
	view.set_search("concepto", Some(SearchInput::text("flete")))
		.unwrap();
	view.set_sort(Some(SortConfig::with_order("monto", SortOrder::Descending)))
		.unwrap();
	view.toggle_select_all_visible();

	let exported = dispatcher
		.dispatch(
			BulkAction::ExportSubset,
			view.selection(),
			view.filtered(),
			view.columns(),
			"Ingresos",
		)
		.await
		.unwrap();
	let DispatchOutcome::Exported(artifact) = exported else {
		panic!("expected an export");
	};

	let requested = dispatcher
		.dispatch(
			BulkAction::DeleteSubset,
			view.selection(),
			view.filtered(),
			view.columns(),
			"Ingresos",
		)
		.await
		.unwrap();
	let DispatchOutcome::ConfirmDelete(confirmation) = requested else {
		panic!("expected a confirmation");
	};
	let report = dispatcher
		.confirm_delete(&confirmation, view.selection_mut())
		.await
		.unwrap();

	// Assert
	assert_eq!(view.filtered_len(), 10);
	assert_eq!(
		view.visible().first().map(|r| r.id()),
		Some(RecordId::from(30))
	);
	assert_eq!(artifact.filename, "Ingresos-seleccion-2024-07-01.xlsx");
	assert_eq!(artifact.row_count, 10);
	assert_eq!(sink.len(), 1);
	assert_eq!(report.deleted, 10);
	assert_eq!(store.len("ingresos"), 20);
	assert!(view.selection().is_empty());
}
