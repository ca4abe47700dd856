//! Table view pipeline
//!
//! [`TableView`] owns the derived state of one table: the filtered and
//! sorted row order, the current page, and the selection. The caller owns the
//! records and columns and pushes changes in through the mutators; each
//! mutator recomputes only the stages its input feeds.
//!
//! ```text
//! records ─┬─ filter (values) ── matching ── sort (key) ── ordered ── page ── visible
//!          └──────────────────────────────── selection (ids) ────────────────┘
//! ```
//!
//! Filtering runs before sorting. Both are pure, so the order of the two
//! stages does not change the result, and re-sorting never needs to
//! re-evaluate predicates.

use crate::error::{Result, TableError};
use crate::filter::{CompiledFilter, FilterConfig, FilterValues, SearchInput, month_from_index};
use crate::pagination::{PageInfo, PaginationConfig};
use crate::selection::SelectionSet;
use crate::sort::{SortConfig, sort_by_value};
use chrono::Month;
use gridline_core::{BoxedColumn, Column, PaginationSettings, Record, RecordId, Value};
use std::fmt;
use std::sync::Arc;

/// Callback invoked with the filtered rows whenever that set changes
pub type FilteredChangeHandler<R> = Box<dyn FnMut(&[&R]) + Send>;

/// Sorted, filtered, paginated view over a record collection
///
/// # Examples
///
/// ```
/// use gridline_core::{BaseColumn, FieldMap, Record};
/// use gridline_tables::filter::{FilterConfig, SearchField, SearchInput};
/// use gridline_tables::table::TableView;
///
/// let records = vec![
///     FieldMap::new(1).with("cliente", "Norte").with("monto", 300),
///     FieldMap::new(2).with("cliente", "Sur").with("monto", 100),
///     FieldMap::new(3).with("cliente", "Norte Express").with("monto", 200),
/// ];
///
/// let mut view = TableView::new(records)
///     .with_column(Box::new(BaseColumn::new("monto", "Monto", |r: &FieldMap| r.field("monto"))))
///     .with_filter_config(FilterConfig::new().search(SearchField::text("cliente", "Cliente")));
///
/// view.sort_by("monto").unwrap();
/// view.set_search("cliente", Some(SearchInput::text("norte"))).unwrap();
///
/// let ids: Vec<String> = view.visible().iter().map(|r| r.id().to_string()).collect();
/// assert_eq!(ids, vec!["3", "1"]);
/// ```
pub struct TableView<R: Record> {
	records: Arc<[R]>,
	columns: Vec<BoxedColumn<R>>,
	config: FilterConfig,
	values: FilterValues,
	compiled: CompiledFilter,
	sort: Option<SortConfig>,
	pagination: PaginationConfig,
	max_page_size: usize,
	selection: SelectionSet,
	/// Indices of records passing the filter, in input order
	matching: Vec<usize>,
	/// `matching` after sorting
	ordered: Vec<usize>,
	on_filtered_change: Option<FilteredChangeHandler<R>>,
}

impl<R: Record> TableView<R> {
	/// View over `records` with default page size and no filters
	pub fn new(records: impl Into<Arc<[R]>>) -> Self {
		let settings = PaginationSettings::default();
		let records = records.into();
		let matching: Vec<usize> = (0..records.len()).collect();
		Self {
			ordered: matching.clone(),
			matching,
			records,
			columns: Vec::new(),
			config: FilterConfig::default(),
			values: FilterValues::default(),
			compiled: CompiledFilter::default(),
			sort: None,
			pagination: PaginationConfig::new(settings.default_page_size),
			max_page_size: settings.max_page_size,
			selection: SelectionSet::new(),
			on_filtered_change: None,
		}
	}

	/// Add a column
	pub fn with_column(mut self, column: BoxedColumn<R>) -> Self {
		self.add_column(column);
		self
	}

	/// Replace all columns
	pub fn with_columns(mut self, columns: Vec<BoxedColumn<R>>) -> Self {
		self.columns = columns;
		self.resort();
		self
	}

	/// Declare the filters this view offers
	///
	/// Any runtime values set so far are discarded.
	pub fn with_filter_config(mut self, config: FilterConfig) -> Self {
		self.config = config;
		self.values = FilterValues::default();
		self.compiled = CompiledFilter::default();
		self.refilter();
		self
	}

	/// Take page sizes from settings
	pub fn with_pagination(mut self, settings: &PaginationSettings) -> Self {
		self.pagination = PaginationConfig::new(settings.default_page_size);
		self.max_page_size = settings.max_page_size.max(1);
		self
	}

	/// Preset the sort key
	pub fn with_default_sort(mut self, sort: SortConfig) -> Self {
		self.sort = Some(sort);
		self.resort();
		self
	}

	/// Register the filtered-set observer
	pub fn on_filtered_change(mut self, handler: impl FnMut(&[&R]) + Send + 'static) -> Self {
		self.on_filtered_change = Some(Box::new(handler));
		self
	}

	/// Add a column after construction
	pub fn add_column(&mut self, column: BoxedColumn<R>) {
		self.columns.push(column);
		self.resort();
	}

	/// Source records, in input order
	pub fn records(&self) -> &[R] {
		&self.records
	}

	/// Columns, in display order
	pub fn columns(&self) -> &[BoxedColumn<R>] {
		&self.columns
	}

	/// Declared filters
	pub fn filter_config(&self) -> &FilterConfig {
		&self.config
	}

	/// Current filter values
	pub fn filter_values(&self) -> &FilterValues {
		&self.values
	}

	/// Active sort, if any
	pub fn sort(&self) -> Option<&SortConfig> {
		self.sort.as_ref()
	}

	/// Current pagination state
	pub fn pagination(&self) -> &PaginationConfig {
		&self.pagination
	}

	/// Replace the record collection
	///
	/// Filters, sort and selection are kept. The current page is kept when it
	/// still exists, otherwise the view returns to page 1.
	pub fn set_records(&mut self, records: impl Into<Arc<[R]>>) {
		self.records = records.into();
		self.refilter();
		self.pagination.retain_or_reset(self.ordered.len());
	}

	/// Sort by `key`, flipping direction when it is already the sort key
	pub fn sort_by(&mut self, key: &str) -> Result<()> {
		let next = SortConfig::toggled(self.sort.as_ref(), key);
		self.set_sort(Some(next))
	}

	/// Set or clear the sort
	///
	/// Sorting never changes the page index.
	pub fn set_sort(&mut self, sort: Option<SortConfig>) -> Result<()> {
		if let Some(config) = &sort
			&& let Some(column) = self.column(&config.field)
			&& !column.sortable()
		{
			return Err(TableError::NotSortable(config.field.clone()));
		}
		self.sort = sort;
		self.resort();
		Ok(())
	}

	/// Replace all filter values
	///
	/// Invalid values are rejected and leave the view unchanged. When the
	/// values differ from the current ones the view returns to page 1;
	/// re-applying the current values changes nothing.
	pub fn set_filter_values(&mut self, values: FilterValues) -> Result<()> {
		if values == self.values {
			return Ok(());
		}
		let compiled = self.config.compile(&values)?;
		self.values = values;
		self.compiled = compiled;
		self.refilter();
		self.pagination.reset();
		Ok(())
	}

	/// Set or clear the year toggle
	pub fn set_year(&mut self, year: Option<i32>) -> Result<()> {
		let mut values = self.values.clone();
		values.year = year;
		self.set_filter_values(values)
	}

	/// Set or clear the month toggle
	pub fn set_month(&mut self, month: Option<Month>) -> Result<()> {
		let mut values = self.values.clone();
		values.month = month;
		self.set_filter_values(values)
	}

	/// Set or clear the month toggle from a zero-based index (0 = January)
	pub fn set_month_index(&mut self, index: Option<u32>) -> Result<()> {
		let month = index.map(month_from_index).transpose()?;
		self.set_month(month)
	}

	/// Set or clear a search input
	pub fn set_search(&mut self, name: &str, input: Option<SearchInput>) -> Result<()> {
		let mut values = self.values.clone();
		match input {
			Some(input) => {
				values.search.insert(name.to_string(), input);
			}
			None => {
				values.search.remove(name);
			}
		}
		self.set_filter_values(values)
	}

	/// Set an enumerated filter; the empty string clears it
	pub fn set_choice(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
		let mut values = self.values.clone();
		let value = value.into();
		if value.is_empty() {
			if self.config.choice_filter(field).is_none() {
				return Err(TableError::UnknownChoiceFilter(field.to_string()));
			}
			values.choices.remove(field);
		} else {
			values.choices.insert(field.to_string(), value);
		}
		self.set_filter_values(values)
	}

	/// Drop every filter value
	pub fn clear_filters(&mut self) {
		self.values = FilterValues::default();
		self.compiled = CompiledFilter::default();
		self.refilter();
		self.pagination.reset();
	}

	/// Years available for the year toggle, newest first
	pub fn available_years(&self) -> Vec<i32> {
		self.config.available_years(&self.records)
	}

	/// Every row passing the filters, in sorted order
	pub fn filtered(&self) -> Vec<&R> {
		self.ordered.iter().map(|&i| &self.records[i]).collect()
	}

	/// Number of rows passing the filters
	pub fn filtered_len(&self) -> usize {
		self.ordered.len()
	}

	/// Rows on the current page
	pub fn visible(&self) -> Vec<&R> {
		self.ordered[self.pagination.window(self.ordered.len())]
			.iter()
			.map(|&i| &self.records[i])
			.collect()
	}

	/// Pager summary
	pub fn page_info(&self) -> PageInfo {
		self.pagination.info(self.ordered.len())
	}

	/// Move to `page`; out-of-range pages are rejected
	pub fn go_to_page(&mut self, page: usize) -> Result<()> {
		self.pagination.go_to(page, self.ordered.len())
	}

	/// Move one page forward
	pub fn next_page(&mut self) -> Result<()> {
		self.go_to_page(self.pagination.page() + 1)
	}

	/// Move one page back
	pub fn previous_page(&mut self) -> Result<()> {
		let page = self.pagination.page();
		self.go_to_page(page.saturating_sub(1))
	}

	/// Change rows per page and return to page 1
	pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
		self.pagination.set_page_size(page_size, self.max_page_size)
	}

	/// Current selection
	pub fn selection(&self) -> &SelectionSet {
		&self.selection
	}

	/// Mutable access to the selection
	pub fn selection_mut(&mut self) -> &mut SelectionSet {
		&mut self.selection
	}

	/// Flip selection of one record; returns whether it is now selected
	pub fn toggle_selected(&mut self, id: impl Into<RecordId>) -> bool {
		self.selection.toggle(id)
	}

	/// Whether the current page is non-empty and fully selected
	pub fn select_all_visible_state(&self) -> bool {
		self.selection.all_selected(&self.visible())
	}

	/// Select-all toggle for the current page only
	pub fn toggle_select_all_visible(&mut self) {
		let range = self.pagination.window(self.ordered.len());
		let window: Vec<&R> = self.ordered[range].iter().map(|&i| &self.records[i]).collect();
		self.selection.toggle_all(&window);
	}

	/// Deselect everything
	pub fn clear_selection(&mut self) {
		self.selection.clear();
	}

	/// Selected records found in the full collection, in input order
	///
	/// Includes records currently filtered out of view.
	pub fn selected_records(&self) -> Vec<&R> {
		self.records
			.iter()
			.filter(|r| self.selection.contains(&r.id()))
			.collect()
	}

	fn column(&self, key: &str) -> Option<&BoxedColumn<R>> {
		self.columns.iter().find(|c| c.key() == key)
	}

	fn sort_value(&self, key: &str, row: &R) -> Value {
		match self.column(key) {
			Some(column) => column.value(row),
			None => row.field(key),
		}
	}

	fn refilter(&mut self) {
		let compiled = &self.compiled;
		self.matching = self
			.records
			.iter()
			.enumerate()
			.filter(|(_, r)| compiled.matches(*r))
			.map(|(i, _)| i)
			.collect();
		tracing::debug!(
			total = self.records.len(),
			matching = self.matching.len(),
			predicates = compiled.len(),
			"table filter recomputed"
		);
		self.resort();
		self.notify_filtered();
	}

	fn resort(&mut self) {
		let mut ordered = self.matching.clone();
		if let Some(sort) = &self.sort {
			sort_by_value(&mut ordered, sort, |&i| self.sort_value(&sort.field, &self.records[i]));
			tracing::trace!(field = %sort.field, order = ?sort.order, "table rows sorted");
		}
		self.ordered = ordered;
	}

	fn notify_filtered(&mut self) {
		if let Some(handler) = self.on_filtered_change.as_mut() {
			let rows: Vec<&R> = self.ordered.iter().map(|&i| &self.records[i]).collect();
			handler(&rows);
		}
	}
}

impl<R: Record> fmt::Debug for TableView<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TableView")
			.field("records", &self.records.len())
			.field("columns", &self.columns)
			.field("values", &self.values)
			.field("sort", &self.sort)
			.field("pagination", &self.pagination)
			.field("selection", &self.selection)
			.field("filtered", &self.ordered.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::filter::SearchField;
	use gridline_core::{BaseColumn, FieldMap};
	use rstest::rstest;
	use std::sync::Mutex;

	fn rows(n: i64) -> Vec<FieldMap> {
		(1..=n)
			.map(|i| FieldMap::new(i).with("monto", i * 10))
			.collect()
	}

	#[rstest]
	fn test_sort_keeps_page() {
		// Arrange
		let mut view = TableView::new(rows(30));
		view.go_to_page(2).unwrap();

		// Act
		view.sort_by("monto").unwrap();

		// Assert
		assert_eq!(view.page_info().page, 2);
	}

	#[rstest]
	fn test_unsortable_column_rejected() {
		let mut view = TableView::new(rows(3)).with_column(Box::new(
			BaseColumn::new("monto", "Monto", |r: &FieldMap| r.field("monto")).sortable(false),
		));

		assert_eq!(
			view.sort_by("monto"),
			Err(TableError::NotSortable("monto".to_string()))
		);
		assert!(view.sort().is_none());
	}

	#[rstest]
	fn test_refresh_keeps_existing_page() {
		let mut view = TableView::new(rows(30));
		view.go_to_page(3).unwrap();

		view.set_records(rows(25));
		assert_eq!(view.page_info().page, 3);

		view.set_records(rows(12));
		assert_eq!(view.page_info().page, 1);
	}

	#[rstest]
	fn test_filtered_change_not_raised_by_sort() {
		// Arrange
		let calls = Arc::new(Mutex::new(Vec::new()));
		let sink = Arc::clone(&calls);
		let mut view = TableView::new(rows(5))
			.on_filtered_change(move |rows: &[&FieldMap]| sink.lock().unwrap().push(rows.len()));

		// Act
		view.sort_by("monto").unwrap();
		view.set_records(rows(3));

		// Assert
		assert_eq!(*calls.lock().unwrap(), vec![3]);
	}

	#[rstest]
	fn test_reapplying_same_filter_keeps_page() {
		// Arrange
		let calls = Arc::new(Mutex::new(0));
		let sink = Arc::clone(&calls);
		let records: Vec<FieldMap> = (1..=30)
			.map(|i| FieldMap::new(i).with("cliente", format!("Transportes Norte {i}")))
			.collect();
		let mut view = TableView::new(records)
			.with_filter_config(FilterConfig::new().search(SearchField::text("cliente", "Cliente")))
			.on_filtered_change(move |_: &[&FieldMap]| *sink.lock().unwrap() += 1);
		view.set_search("cliente", Some(SearchInput::text("norte"))).unwrap();
		view.go_to_page(3).unwrap();

		// Act
		view.set_search("cliente", Some(SearchInput::text("norte"))).unwrap();

		// Assert
		assert_eq!(view.page_info().page, 3);
		assert_eq!(*calls.lock().unwrap(), 1);
	}

	#[rstest]
	fn test_added_column_drives_default_sort() {
		// Arrange
		let records = vec![
			FieldMap::new(1).with("monto", 5),
			FieldMap::new(2).with("monto", 1),
			FieldMap::new(3).with("monto", 3),
		];

		// Act
		let view = TableView::new(records)
			.with_default_sort(SortConfig::new("orden"))
			.with_column(Box::new(BaseColumn::new("orden", "Orden", |r: &FieldMap| {
				r.field("monto")
			})));

		// Assert
		let ids: Vec<String> = view.visible().iter().map(|r| r.id().to_string()).collect();
		assert_eq!(ids, vec!["2", "3", "1"]);
	}

	#[rstest]
	fn test_select_all_uses_current_page() {
		let mut view = TableView::new(rows(15));
		view.toggle_select_all_visible();
		assert_eq!(view.selection().len(), 10);
		assert!(view.select_all_visible_state());

		view.toggle_select_all_visible();
		assert!(view.selection().is_empty());
	}
}
