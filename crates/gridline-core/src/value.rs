//! Field values read out of records
//!
//! Every field lookup, whether through a typed column accessor or the dynamic
//! [`Record::field`](crate::Record::field) path, produces a [`Value`]. The
//! sort, filter and export stages only ever reason about this closed set of
//! shapes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Timestamp layouts accepted when a text field is read as a calendar day,
/// tried after RFC 3339.
const DATETIME_LAYOUTS: &[&str] = &[
	"%Y-%m-%dT%H:%M:%S%.f",
	"%Y-%m-%d %H:%M:%S%.f",
	"%Y-%m-%dT%H:%M",
	"%Y-%m-%d %H:%M",
];

/// Timestamp layouts that carry a numeric offset (`+00`, `-05:00`).
const OFFSET_DATETIME_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// A single field value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	/// Absent or null field
	#[default]
	Null,
	/// Boolean flag
	Bool(bool),
	/// Integer number
	Int(i64),
	/// Floating point number
	Float(f64),
	/// Free text
	Text(String),
	/// Calendar date
	Date(NaiveDate),
	/// Date and time without zone
	DateTime(NaiveDateTime),
}

impl Value {
	/// Returns true for [`Value::Null`]
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Returns true for null values and whitespace-only text
	pub fn is_blank(&self) -> bool {
		match self {
			Value::Null => true,
			Value::Text(s) => s.trim().is_empty(),
			_ => false,
		}
	}

	/// Numeric view of the value
	///
	/// Text is parsed after trimming; non-finite numbers are rejected.
	///
	/// # Examples
	///
	/// ```
	/// use gridline_core::Value;
	///
	/// assert_eq!(Value::from(12).as_f64(), Some(12.0));
	/// assert_eq!(Value::from(" 3.5 ").as_f64(), Some(3.5));
	/// assert_eq!(Value::from("n/a").as_f64(), None);
	/// ```
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Int(i) => Some(*i as f64),
			Value::Float(f) if f.is_finite() => Some(*f),
			Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
			_ => None,
		}
	}

	/// Boolean view of the value (`true`/`false` text is accepted)
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
				"true" => Some(true),
				"false" => Some(false),
				_ => None,
			},
			_ => None,
		}
	}

	/// Calendar day carried by the value, ignoring any time of day
	///
	/// Returns `None` when the value cannot be read as a date. Callers that
	/// filter on dates treat `None` as a failed match.
	///
	/// # Examples
	///
	/// ```
	/// use chrono::NaiveDate;
	/// use gridline_core::Value;
	///
	/// let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
	/// assert_eq!(Value::from("2024-01-05").to_calendar_day(), Some(day));
	/// assert_eq!(Value::from("2024-01-05T18:30:00Z").to_calendar_day(), Some(day));
	/// assert_eq!(Value::from("yesterday").to_calendar_day(), None);
	/// ```
	pub fn to_calendar_day(&self) -> Option<NaiveDate> {
		match self {
			Value::Date(d) => Some(*d),
			Value::DateTime(dt) => Some(dt.date()),
			Value::Text(s) => parse_calendar_day(s),
			_ => None,
		}
	}

	/// Text shown for the value on screen and in search matching
	pub fn display(&self) -> Cow<'_, str> {
		match self {
			Value::Null => Cow::Borrowed(""),
			Value::Text(s) => Cow::Borrowed(s.as_str()),
			other => Cow::Owned(other.to_string()),
		}
	}

	fn rank(&self) -> u8 {
		match self {
			Value::Null => 0,
			Value::Bool(_) => 1,
			Value::Int(_) | Value::Float(_) => 2,
			Value::Date(_) | Value::DateTime(_) => 3,
			Value::Text(_) => 4,
		}
	}

	/// Total order over values
	///
	/// Numbers compare numerically, dates chronologically (a bare date sorts
	/// as midnight), text by code point. Values of different kinds order by
	/// kind. Null compares equal to null and below everything else; the sort
	/// stage decides where nulls land.
	pub fn total_cmp(&self, other: &Value) -> Ordering {
		match (self, other) {
			(Value::Null, Value::Null) => Ordering::Equal,
			(Value::Bool(a), Value::Bool(b)) => a.cmp(b),
			(Value::Int(a), Value::Int(b)) => a.cmp(b),
			(Value::Text(a), Value::Text(b)) => a.cmp(b),
			(a, b) if a.rank() == 2 && b.rank() == 2 => {
				let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
				x.total_cmp(&y)
			}
			(a, b) if a.rank() == 3 && b.rank() == 3 => a.as_datetime().cmp(&b.as_datetime()),
			(a, b) => a.rank().cmp(&b.rank()),
		}
	}

	fn as_datetime(&self) -> Option<NaiveDateTime> {
		match self {
			Value::Date(d) => d.and_hms_opt(0, 0, 0),
			Value::DateTime(dt) => Some(*dt),
			_ => None,
		}
	}
}

/// Parses text into a calendar day
///
/// Accepts RFC 3339 timestamps, ISO dates and date-times with or without an
/// offset, and `dd/mm/yyyy`. For timestamps carrying an offset the day is the
/// one written in the text, not the day after conversion to UTC.
pub fn parse_calendar_day(text: &str) -> Option<NaiveDate> {
	let text = text.trim();
	if text.is_empty() {
		return None;
	}

	if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
		return Some(dt.date_naive());
	}
	for layout in OFFSET_DATETIME_LAYOUTS {
		if let Ok(dt) = DateTime::parse_from_str(text, layout) {
			return Some(dt.date_naive());
		}
	}
	for layout in DATETIME_LAYOUTS {
		if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
			return Some(dt.date());
		}
	}
	DATE_LAYOUTS
		.iter()
		.find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => Ok(()),
			Value::Bool(b) => write!(f, "{}", b),
			Value::Int(i) => write!(f, "{}", i),
			Value::Float(x) => write!(f, "{}", x),
			Value::Text(s) => f.write_str(s),
			Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
			Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(i64::from(v))
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<u32> for Value {
	fn from(v: u32) -> Self {
		Value::Int(i64::from(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Text(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Text(v)
	}
}

impl From<&String> for Value {
	fn from(v: &String) -> Self {
		Value::Text(v.clone())
	}
}

impl From<NaiveDate> for Value {
	fn from(v: NaiveDate) -> Self {
		Value::Date(v)
	}
}

impl From<NaiveDateTime> for Value {
	fn from(v: NaiveDateTime) -> Self {
		Value::DateTime(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map(Into::into).unwrap_or(Value::Null)
	}
}

impl From<serde_json::Value> for Value {
	fn from(v: serde_json::Value) -> Self {
		match v {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(b) => Value::Bool(b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Value::Int(i),
				None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
			},
			serde_json::Value::String(s) => Value::Text(s),
			other => Value::Text(other.to_string()),
		}
	}
}

impl From<&serde_json::Value> for Value {
	fn from(v: &serde_json::Value) -> Self {
		Value::from(v.clone())
	}
}
