//! Record identity and field access

use crate::error::{CoreError, CoreResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable identity of a record
///
/// Numeric and textual primary keys share one representation so that a
/// selection can hold either.
///
/// # Examples
///
/// ```
/// use gridline_core::RecordId;
///
/// assert_eq!(RecordId::from(42), RecordId::from("42"));
/// assert_eq!(RecordId::from(7).as_str(), "7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
	/// Create an id from any string-like key
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Borrow the id text
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Read an id out of a field value
	///
	/// Integers and non-blank text qualify; anything else does not.
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Int(i) => Some(Self(i.to_string())),
			Value::Text(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
			_ => None,
		}
	}
}

impl fmt::Display for RecordId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<i32> for RecordId {
	fn from(id: i32) -> Self {
		Self(id.to_string())
	}
}

impl From<i64> for RecordId {
	fn from(id: i64) -> Self {
		Self(id.to_string())
	}
}

impl From<u32> for RecordId {
	fn from(id: u32) -> Self {
		Self(id.to_string())
	}
}

impl From<u64> for RecordId {
	fn from(id: u64) -> Self {
		Self(id.to_string())
	}
}

impl From<&str> for RecordId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for RecordId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<&RecordId> for RecordId {
	fn from(id: &RecordId) -> Self {
		id.clone()
	}
}

/// A row the engine can derive views over
///
/// The engine never mutates records. `id` must be unique and stable across
/// refreshes of the collection; `field` is the dynamic lookup used by
/// filters and by columns built with [`field_column`](crate::field_column).
pub trait Record {
	/// Unique, stable identity
	fn id(&self) -> RecordId;

	/// Value stored under `key`, or [`Value::Null`] when absent
	fn field(&self, key: &str) -> Value;
}

impl<R: Record + ?Sized> Record for &R {
	fn id(&self) -> RecordId {
		(**self).id()
	}

	fn field(&self, key: &str) -> Value {
		(**self).field(key)
	}
}

impl<R: Record + ?Sized> Record for std::sync::Arc<R> {
	fn id(&self) -> RecordId {
		(**self).id()
	}

	fn field(&self, key: &str) -> Value {
		(**self).field(key)
	}
}

/// Fully dynamic record: an id plus a map of named values
///
/// # Examples
///
/// ```
/// use gridline_core::{FieldMap, Record, Value};
///
/// let row = FieldMap::new(1).with("monto", 100).with("fecha", "2024-01-05");
/// assert_eq!(row.field("monto"), Value::Int(100));
/// assert_eq!(row.field("missing"), Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
	id: RecordId,
	fields: HashMap<String, Value>,
}

impl FieldMap {
	/// Create an empty record with the given id
	pub fn new(id: impl Into<RecordId>) -> Self {
		Self {
			id: id.into(),
			fields: HashMap::new(),
		}
	}

	/// Builder-style field setter
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.fields.insert(key.into(), value.into());
		self
	}

	/// Set a field in place
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.fields.insert(key.into(), value.into());
	}

	/// Borrow a field
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	/// Number of stored fields
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether no fields are stored
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Build a record from a JSON object, reading the id from `id_field`
	///
	/// # Errors
	///
	/// Returns [`CoreError::MissingId`] when the id field is absent and
	/// [`CoreError::InvalidId`] when it is neither an integer nor text.
	///
	/// # Examples
	///
	/// ```
	/// use gridline_core::{FieldMap, Record, RecordId};
	///
	/// let json = serde_json::json!({"id": 7, "nombre": "Ana"});
	/// let row = FieldMap::from_json(json.as_object().unwrap(), "id").unwrap();
	/// assert_eq!(row.id(), RecordId::from(7));
	/// ```
	pub fn from_json(
		object: &serde_json::Map<String, serde_json::Value>,
		id_field: &str,
	) -> CoreResult<Self> {
		let raw_id = object
			.get(id_field)
			.ok_or_else(|| CoreError::MissingId(id_field.to_string()))?;
		let id = RecordId::from_value(&Value::from(raw_id))
			.ok_or_else(|| CoreError::InvalidId(id_field.to_string()))?;

		let fields = object
			.iter()
			.map(|(key, value)| (key.clone(), Value::from(value)))
			.collect();

		Ok(Self { id, fields })
	}
}

impl Record for FieldMap {
	fn id(&self) -> RecordId {
		self.id.clone()
	}

	fn field(&self, key: &str) -> Value {
		match self.fields.get(key) {
			Some(value) => value.clone(),
			None if key == "id" => Value::Text(self.id.as_str().to_string()),
			None => Value::Null,
		}
	}
}
