//! Column descriptors
//!
//! A column ties a header to an accessor. The accessor is a typed closure
//! bound when the column is built, so the common case is checked at compile
//! time; [`field_column`] falls back to [`Record::field`] for configurations
//! that only know field names at runtime.
//!
//! How a cell is shown is a [`CellRenderer`] strategy attached to the column,
//! called per cell with the raw value and the row.

use crate::record::Record;
use crate::value::Value;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

/// Projection from a raw cell value to display text
///
/// Renderers must be pure: the same value and row always render the same
/// text. Any `Fn(&Value, &R) -> String` closure is a renderer.
pub trait CellRenderer<R>: Send + Sync {
	/// Render the cell
	fn render(&self, value: &Value, row: &R) -> String;
}

impl<R, F> CellRenderer<R> for F
where
	F: Fn(&Value, &R) -> String + Send + Sync,
{
	fn render(&self, value: &Value, row: &R) -> String {
		self(value, row)
	}
}

/// Trait for table column definitions
///
/// Each column is responsible for:
/// - Providing an accessor key and header text
/// - Extracting the raw value from a row
/// - Rendering the value for display
pub trait Column: Debug {
	/// The type of rows this column operates on
	type Row;

	/// Accessor key, used as the identifier for sorting and export classes
	fn key(&self) -> &str;

	/// Header text
	fn header(&self) -> &str;

	/// Raw value for the given row
	fn value(&self, row: &Self::Row) -> Value;

	/// Display text for the given row
	///
	/// Default: the raw value's display form
	fn render(&self, row: &Self::Row) -> String {
		self.value(row).display().into_owned()
	}

	/// Whether a custom renderer is attached
	///
	/// Default: false
	fn has_renderer(&self) -> bool {
		false
	}

	/// Returns whether this column can be sorted
	///
	/// Default: true
	fn sortable(&self) -> bool {
		true
	}
}

/// Boxed column over rows of type `R`
pub type BoxedColumn<R> = Box<dyn Column<Row = R>>;

/// A column implementation using a function to extract values
///
/// # Example
///
/// ```rust
/// use gridline_core::{BaseColumn, Column, Value};
///
/// struct Trip {
///     id: i64,
///     destino: String,
/// }
///
/// let destino = BaseColumn::new("destino", "Destino", |trip: &Trip| {
///     Value::from(&trip.destino)
/// })
/// .cell(|value: &Value, _trip: &Trip| value.display().to_uppercase());
///
/// let trip = Trip { id: 1, destino: "Monterrey".to_string() };
/// assert_eq!(destino.render(&trip), "MONTERREY");
/// ```
pub struct BaseColumn<R, F>
where
	F: Fn(&R) -> Value,
{
	key: String,
	header: String,
	accessor: F,
	cell: Option<Arc<dyn CellRenderer<R>>>,
	sortable: bool,
	_phantom: PhantomData<fn(&R)>,
}

impl<R, F> BaseColumn<R, F>
where
	F: Fn(&R) -> Value,
{
	/// Creates a new column
	pub fn new(key: impl Into<String>, header: impl Into<String>, accessor: F) -> Self {
		Self {
			key: key.into(),
			header: header.into(),
			accessor,
			cell: None,
			sortable: true,
			_phantom: PhantomData,
		}
	}

	/// Attaches a cell renderer
	pub fn cell(mut self, renderer: impl CellRenderer<R> + 'static) -> Self {
		self.cell = Some(Arc::new(renderer));
		self
	}

	/// Sets whether this column is sortable
	pub fn sortable(mut self, sortable: bool) -> Self {
		self.sortable = sortable;
		self
	}
}

impl<R, F> Debug for BaseColumn<R, F>
where
	F: Fn(&R) -> Value,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BaseColumn")
			.field("key", &self.key)
			.field("header", &self.header)
			.field("sortable", &self.sortable)
			.field("cell", &self.cell.is_some())
			.finish_non_exhaustive()
	}
}

impl<R, F> Column for BaseColumn<R, F>
where
	F: Fn(&R) -> Value,
{
	type Row = R;

	fn key(&self) -> &str {
		&self.key
	}

	fn header(&self) -> &str {
		&self.header
	}

	fn value(&self, row: &R) -> Value {
		(self.accessor)(row)
	}

	fn render(&self, row: &R) -> String {
		let value = self.value(row);
		match &self.cell {
			Some(renderer) => renderer.render(&value, row),
			None => value.display().into_owned(),
		}
	}

	fn has_renderer(&self) -> bool {
		self.cell.is_some()
	}

	fn sortable(&self) -> bool {
		self.sortable
	}
}

/// Column backed by the dynamic [`Record::field`] lookup
///
/// # Example
///
/// ```rust
/// use gridline_core::{field_column, Column, FieldMap};
///
/// let monto = field_column::<FieldMap>("monto", "Monto");
/// let row = FieldMap::new(1).with("monto", 250);
/// assert_eq!(monto.render(&row), "250");
/// ```
pub fn field_column<R: Record>(
	key: impl Into<String>,
	header: impl Into<String>,
) -> BaseColumn<R, impl Fn(&R) -> Value> {
	let key = key.into();
	let lookup = key.clone();
	BaseColumn::new(key, header, move |row: &R| row.field(&lookup))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::record::FieldMap;
	use rstest::rstest;

	#[derive(Debug)]
	struct TestRow {
		value: String,
	}

	#[rstest]
	fn test_base_column_creation() {
		let column = BaseColumn::new("test", "Test Column", |row: &TestRow| {
			Value::from(&row.value)
		});
		assert_eq!(column.key(), "test");
		assert_eq!(column.header(), "Test Column");
		assert!(Column::sortable(&column));
		assert!(!column.has_renderer());
	}

	#[rstest]
	fn test_base_column_render_without_cell() {
		let column = BaseColumn::new("test", "Test", |row: &TestRow| Value::from(&row.value));
		let row = TestRow {
			value: "Hello".to_string(),
		};
		assert_eq!(column.render(&row), "Hello");
	}

	#[rstest]
	fn test_cell_renderer_receives_value_and_row() {
		let column = BaseColumn::new("test", "Test", |row: &TestRow| Value::from(row.value.len() as i64))
			.cell(|value: &Value, row: &TestRow| format!("{} ({})", row.value, value));
		let row = TestRow {
			value: "abc".to_string(),
		};
		assert_eq!(column.value(&row), Value::Int(3));
		assert_eq!(column.render(&row), "abc (3)");
		assert!(column.has_renderer());
	}

	#[rstest]
	fn test_field_column_reads_dynamic_field() {
		let column = field_column::<FieldMap>("estado", "Estado").sortable(false);
		let row = FieldMap::new(1).with("estado", "pagado");
		assert_eq!(column.value(&row), Value::from("pagado"));
		assert!(!Column::sortable(&column));
	}

	#[rstest]
	fn test_boxed_columns_are_heterogeneous() {
		let columns: Vec<BoxedColumn<FieldMap>> = vec![
			Box::new(field_column("a", "A")),
			Box::new(BaseColumn::new("b", "B", |_row: &FieldMap| Value::Int(1))),
		];
		let row = FieldMap::new(1).with("a", "x");
		let rendered: Vec<String> = columns.iter().map(|c| c.render(&row)).collect();
		assert_eq!(rendered, vec!["x".to_string(), "1".to_string()]);
	}
}
