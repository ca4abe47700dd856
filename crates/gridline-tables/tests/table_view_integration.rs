//! Table view integration tests
//!
//! # Test Categories
//!
//! - Filter scenarios over the designated date field
//! - Selection persistence across filter and page changes
//! - Select-all-visible page scoping
//! - Filter changes resetting the page, sort changes keeping it

mod fixtures;

use chrono::NaiveDate;
use fixtures::{Trip, ids, trip, trip_columns, trips};
use gridline_core::{BoxedColumn, FieldMap, RecordId};
use gridline_tables::{
	FilterConfig, FilterValues, SearchField, SearchInput, SortConfig, SortOrder, TableError,
	TableView,
};
use rstest::*;
use std::sync::{Arc, Mutex};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[fixture]
fn scenario_records() -> Vec<FieldMap> {
	vec![
		FieldMap::new(1).with("monto", 100).with("fecha", "2024-01-05"),
		FieldMap::new(2).with("monto", 200).with("fecha", "2024-02-10"),
	]
}

#[fixture]
fn trip_view(trips: Vec<Trip>, trip_columns: Vec<BoxedColumn<Trip>>) -> TableView<Trip> {
	TableView::new(trips)
		.with_columns(trip_columns)
		.with_filter_config(
			FilterConfig::new()
				.date_field("fecha")
				.search(SearchField::text("destino", "Destino"))
				.search(SearchField::date_range("rango", "Rango", "fecha")),
		)
}

// =============================================================================
// Filter scenarios
// =============================================================================

#[rstest]
fn test_january_month_filter(scenario_records: Vec<FieldMap>) {
	// Arrange
	let mut view = TableView::new(scenario_records)
		.with_filter_config(FilterConfig::new().date_field("fecha"));

	// Act
	view.set_month_index(Some(0)).unwrap();

	// Assert
	assert_eq!(ids(&view.filtered()), vec![RecordId::from(1)]);
}

#[rstest]
fn test_inclusive_date_range(mut scenario_records: Vec<FieldMap>) {
	// Arrange
	scenario_records.push(FieldMap::new(3).with("monto", 50).with("fecha", "2024-01-31"));
	let config = FilterConfig::new().search(SearchField::date_range("rango", "Rango", "fecha"));
	let mut view = TableView::new(scenario_records).with_filter_config(config);

	// Act
	view.set_search(
		"rango",
		Some(SearchInput::range(Some(day(2024, 1, 1)), Some(day(2024, 1, 31)))),
	)
	.unwrap();

	// Assert
	assert_eq!(ids(&view.filtered()), vec![RecordId::from(1), RecordId::from(3)]);
}

#[rstest]
fn test_rejected_filter_leaves_view_untouched(mut trip_view: TableView<Trip>) {
	// Arrange
	trip_view.set_search("destino", Some(SearchInput::text("monterrey"))).unwrap();
	let before = ids(&trip_view.filtered());

	// Act
	let result = trip_view.set_search("origen", Some(SearchInput::text("x")));

	// Assert
	assert_eq!(result, Err(TableError::UnknownSearchField("origen".to_string())));
	assert_eq!(ids(&trip_view.filtered()), before);
	assert_eq!(trip_view.filter_values().search.len(), 1);
}

#[rstest]
fn test_available_years(trip_view: TableView<Trip>) {
	assert_eq!(trip_view.available_years(), vec![2024]);
}

// =============================================================================
// Selection
// =============================================================================

#[rstest]
fn test_selection_survives_filtering() {
	// Arrange
	let records = vec![
		trip(1, "Monterrey", Some(10.0), "2024-01-01"),
		trip(2, "Puebla", Some(20.0), "2024-01-02"),
	];
	let mut view = TableView::new(records)
		.with_filter_config(FilterConfig::new().search(SearchField::text("destino", "Destino")));
	view.toggle_selected(1);
	view.toggle_selected(2);

	// Act
	view.set_search("destino", Some(SearchInput::text("puebla"))).unwrap();
	assert_eq!(view.filtered_len(), 1);
	view.set_search("destino", None).unwrap();

	// Assert
	assert!(view.selection().contains(&RecordId::from(1)));
	assert!(view.selection().contains(&RecordId::from(2)));
	assert_eq!(view.selected_records().len(), 2);
}

#[rstest]
fn test_hidden_selection_still_reaches_selected_records() {
	let records = vec![
		trip(1, "Monterrey", Some(10.0), "2024-01-01"),
		trip(2, "Puebla", Some(20.0), "2024-01-02"),
	];
	let mut view = TableView::new(records)
		.with_filter_config(FilterConfig::new().search(SearchField::text("destino", "Destino")));
	view.toggle_selected(1);

	view.set_search("destino", Some(SearchInput::text("puebla"))).unwrap();

	assert_eq!(ids(&view.selected_records()), vec![RecordId::from(1)]);
}

#[rstest]
fn test_select_all_visible_is_page_scoped(trips: Vec<Trip>) {
	// Arrange: 20 rows, 2 pages of 10
	let mut view = TableView::new(trips.into_iter().take(20).collect::<Vec<_>>());

	// Act
	view.toggle_select_all_visible();

	// Assert
	let page_one = ids(&view.visible());
	assert_eq!(page_one.len(), 10);
	assert_eq!(view.selection().to_vec().len(), 10);
	assert!(page_one.iter().all(|id| view.selection().contains(id)));
	assert!(view.select_all_visible_state());

	view.go_to_page(2).unwrap();
	assert!(!view.select_all_visible_state());
	assert_eq!(view.selection().len(), 10);
}

#[rstest]
fn test_deselect_all_visible_keeps_other_pages(trips: Vec<Trip>) {
	let mut view = TableView::new(trips.into_iter().take(20).collect::<Vec<_>>());
	view.toggle_select_all_visible();
	view.go_to_page(2).unwrap();
	view.toggle_select_all_visible();
	assert_eq!(view.selection().len(), 20);

	view.toggle_select_all_visible();

	assert_eq!(view.selection().len(), 10);
	view.go_to_page(1).unwrap();
	assert!(view.select_all_visible_state());
}

#[rstest]
fn test_select_all_on_empty_page() {
	let mut view: TableView<Trip> = TableView::new(Vec::new());
	assert!(!view.select_all_visible_state());
	view.toggle_select_all_visible();
	assert!(view.selection().is_empty());
}

// =============================================================================
// Page resets
// =============================================================================

#[rstest]
fn test_filter_change_resets_page(mut trip_view: TableView<Trip>) {
	trip_view.go_to_page(3).unwrap();

	trip_view.set_year(Some(2024)).unwrap();

	assert_eq!(trip_view.page_info().page, 1);
}

#[rstest]
fn test_sort_change_keeps_page(mut trip_view: TableView<Trip>) {
	trip_view.go_to_page(2).unwrap();

	trip_view.sort_by("monto").unwrap();
	trip_view.sort_by("monto").unwrap();

	assert_eq!(trip_view.page_info().page, 2);
	assert_eq!(trip_view.sort(), Some(&SortConfig::with_order("monto", SortOrder::Descending)));
}

#[rstest]
fn test_page_size_change_resets_page(mut trip_view: TableView<Trip>) {
	trip_view.go_to_page(2).unwrap();

	trip_view.set_page_size(5).unwrap();

	let info = trip_view.page_info();
	assert_eq!(info.page, 1);
	assert_eq!(info.total_pages, 5);
}

#[rstest]
fn test_out_of_range_page_rejected(mut trip_view: TableView<Trip>) {
	trip_view.go_to_page(3).unwrap();

	assert!(trip_view.next_page().is_err());
	assert_eq!(trip_view.page_info().page, 3);
	assert!(trip_view.go_to_page(0).is_err());
	assert_eq!(trip_view.page_info().page, 3);
}

// =============================================================================
// Sorting through the view
// =============================================================================

#[rstest]
fn test_missing_amounts_sort_last(mut trip_view: TableView<Trip>) {
	trip_view.set_page_size(25).unwrap();

	for _ in 0..2 {
		trip_view.sort_by("monto").unwrap();
		let visible = trip_view.visible();
		let first_null = visible.iter().position(|t| t.monto.is_none()).unwrap();
		assert!(visible[first_null..].iter().all(|t| t.monto.is_none()));
	}
}

#[rstest]
fn test_filtered_change_observer(trips: Vec<Trip>) {
	// Arrange
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	let mut view = TableView::new(trips)
		.with_filter_config(FilterConfig::new().search(SearchField::text("destino", "Destino")))
		.on_filtered_change(move |rows: &[&Trip]| sink.lock().unwrap().push(rows.len()));

	// Act
	view.set_search("destino", Some(SearchInput::text("monterrey"))).unwrap();
	view.sort_by("destino").unwrap();
	view.set_filter_values(FilterValues::new()).unwrap();

	// Assert
	assert_eq!(*seen.lock().unwrap(), vec![12, 25]);
}
