//! Sort stage
//!
//! Orders rows by one field. Null values always land after every defined
//! value, whichever direction is active, and the sort is stable so rows with
//! equal keys keep their input order.

use gridline_core::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
	/// Smallest first
	#[default]
	Ascending,
	/// Largest first
	Descending,
}

impl SortOrder {
	/// The opposite direction
	pub fn reversed(self) -> Self {
		match self {
			SortOrder::Ascending => SortOrder::Descending,
			SortOrder::Descending => SortOrder::Ascending,
		}
	}
}

/// Active sort key and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
	/// Field key rows are ordered by
	pub field: String,
	/// Direction
	pub order: SortOrder,
}

impl SortConfig {
	/// Sort ascending by `field`
	pub fn new(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			order: SortOrder::Ascending,
		}
	}

	/// Sort by `field` in the given direction
	pub fn with_order(field: impl Into<String>, order: SortOrder) -> Self {
		Self {
			field: field.into(),
			order,
		}
	}

	/// Next state after the user picks `field`
	///
	/// Picking the active field flips its direction; picking any other field
	/// starts ascending.
	///
	/// # Examples
	///
	/// ```
	/// use gridline_tables::sort::{SortConfig, SortOrder};
	///
	/// let first = SortConfig::toggled(None, "monto");
	/// assert_eq!(first.order, SortOrder::Ascending);
	///
	/// let second = SortConfig::toggled(Some(&first), "monto");
	/// assert_eq!(second.order, SortOrder::Descending);
	///
	/// let other = SortConfig::toggled(Some(&second), "fecha");
	/// assert_eq!(other, SortConfig::new("fecha"));
	/// ```
	pub fn toggled(current: Option<&SortConfig>, field: &str) -> Self {
		match current {
			Some(active) if active.field == field => Self {
				field: active.field.clone(),
				order: active.order.reversed(),
			},
			_ => Self::new(field),
		}
	}

	/// Compare two field values under this configuration
	pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
		compare_nulls_last(a, b, self.order)
	}
}

/// Directional comparison that always places nulls last
///
/// # Examples
///
/// ```
/// use gridline_core::Value;
/// use gridline_tables::sort::{compare_nulls_last, SortOrder};
/// use std::cmp::Ordering;
///
/// let null = Value::Null;
/// let one = Value::Int(1);
/// assert_eq!(compare_nulls_last(&null, &one, SortOrder::Ascending), Ordering::Greater);
/// assert_eq!(compare_nulls_last(&null, &one, SortOrder::Descending), Ordering::Greater);
/// ```
pub fn compare_nulls_last(a: &Value, b: &Value, order: SortOrder) -> Ordering {
	match (a.is_null(), b.is_null()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => match order {
			SortOrder::Ascending => a.total_cmp(b),
			SortOrder::Descending => b.total_cmp(a),
		},
	}
}

/// Cached sort key carrying its direction
struct SortKey {
	value: Value,
	order: SortOrder,
}

impl PartialEq for SortKey {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for SortKey {
	fn cmp(&self, other: &Self) -> Ordering {
		compare_nulls_last(&self.value, &other.value, self.order)
	}
}

/// Stable in-place sort of `rows` by the value `key_of` extracts
///
/// Each key is extracted once per row.
pub fn sort_by_value<T>(rows: &mut [T], config: &SortConfig, key_of: impl Fn(&T) -> Value) {
	let order = config.order;
	rows.sort_by_cached_key(|row| SortKey {
		value: key_of(row),
		order,
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_ascending_with_nulls_last() {
		// Arrange
		let mut rows = vec![Value::Int(3), Value::Null, Value::Int(1), Value::Int(2)];

		// Act
		sort_by_value(&mut rows, &SortConfig::new("x"), |v| v.clone());

		// Assert
		assert_eq!(rows, vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Null]);
	}

	#[rstest]
	fn test_descending_keeps_nulls_last() {
		// Arrange
		let mut rows = vec![Value::Null, Value::Int(1), Value::Int(3), Value::Null];
		let config = SortConfig::with_order("x", SortOrder::Descending);

		// Act
		sort_by_value(&mut rows, &config, |v| v.clone());

		// Assert
		assert_eq!(rows, vec![Value::Int(3), Value::Int(1), Value::Null, Value::Null]);
	}

	#[rstest]
	fn test_equal_keys_keep_input_order() {
		// Arrange
		let mut rows = vec![(1, "b"), (2, "a"), (3, "b"), (4, "a")];

		// Act
		sort_by_value(&mut rows, &SortConfig::new("letter"), |(_, letter)| {
			Value::from(*letter)
		});

		// Assert
		let ids: Vec<i32> = rows.iter().map(|(id, _)| *id).collect();
		assert_eq!(ids, vec![2, 4, 1, 3]);
	}

	#[rstest]
	fn test_toggle_flips_only_same_field() {
		let asc = SortConfig::new("monto");
		let desc = SortConfig::toggled(Some(&asc), "monto");
		assert_eq!(desc.order, SortOrder::Descending);
		assert_eq!(SortConfig::toggled(Some(&desc), "monto").order, SortOrder::Ascending);
		assert_eq!(SortConfig::toggled(Some(&desc), "fecha").order, SortOrder::Ascending);
	}
}
