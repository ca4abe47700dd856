//! Filter stage
//!
//! A [`FilterConfig`] declares which filters a view offers: year and month
//! toggles over one designated date field, named search fields, and
//! enumerated choice filters. [`FilterValues`] holds what the user has
//! currently entered. The two are compiled into a list of predicates that a
//! record must all satisfy to stay in the filtered set.
//!
//! Records whose date cannot be parsed fail every active date predicate.

use crate::error::{Result, TableError};
use chrono::{Datelike, Month, NaiveDate};
use gridline_core::Record;
use gridline_core::text::contains_ignore_case;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Input kind of a search field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchKind {
	/// Case-insensitive substring match
	Text,
	/// Calendar-day equality
	ExactDate,
	/// Inclusive day range over `field`, which may differ from the search
	/// field's own name
	DateRange {
		/// Record field the bounds are checked against
		field: String,
	},
}

impl SearchKind {
	fn expected_input(&self) -> &'static str {
		match self {
			SearchKind::Text => "text",
			SearchKind::ExactDate => "date",
			SearchKind::DateRange { .. } => "date range",
		}
	}
}

/// A named search control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchField {
	name: String,
	label: String,
	kind: SearchKind,
}

impl SearchField {
	/// Text search over the record field `name`
	pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			label: label.into(),
			kind: SearchKind::Text,
		}
	}

	/// Exact calendar-day search over the record field `name`
	pub fn exact_date(name: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			label: label.into(),
			kind: SearchKind::ExactDate,
		}
	}

	/// Day-range search labelled `name` but evaluated against `field`
	///
	/// # Examples
	///
	/// ```
	/// use gridline_tables::filter::SearchField;
	///
	/// let range = SearchField::date_range("periodo", "Periodo", "fecha_pago");
	/// assert_eq!(range.name(), "periodo");
	/// assert_eq!(range.target_field(), "fecha_pago");
	/// ```
	pub fn date_range(
		name: impl Into<String>,
		label: impl Into<String>,
		field: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			label: label.into(),
			kind: SearchKind::DateRange {
				field: field.into(),
			},
		}
	}

	/// Control name, used as the key in [`FilterValues`]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Label shown next to the control
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Input kind
	pub fn kind(&self) -> &SearchKind {
		&self.kind
	}

	/// Record field the predicate reads
	pub fn target_field(&self) -> &str {
		match &self.kind {
			SearchKind::DateRange { field } => field,
			_ => &self.name,
		}
	}
}

/// One option of a [`ChoiceFilter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
	/// Value compared against the record field
	pub value: String,
	/// Text shown in the select
	pub label: String,
}

/// Enumerated filter: exact match of a field against a fixed option list
///
/// # Examples
///
/// ```
/// use gridline_tables::filter::ChoiceFilter;
///
/// let filter = ChoiceFilter::new("estado", "Estado")
///     .add_choice("pagado", "Pagado")
///     .add_choice("pendiente", "Pendiente");
///
/// assert_eq!(filter.options().len(), 2);
/// assert!(filter.has_option("pagado"));
/// assert!(!filter.has_option("Pagado"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceFilter {
	field: String,
	title: String,
	options: Vec<ChoiceOption>,
}

impl ChoiceFilter {
	/// Create a filter with no options
	pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			title: title.into(),
			options: Vec::new(),
		}
	}

	/// Add one option
	pub fn add_choice(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
		self.options.push(ChoiceOption {
			value: value.into(),
			label: label.into(),
		});
		self
	}

	/// Add several `(value, label)` options
	pub fn with_choices<I, V, L>(mut self, choices: I) -> Self
	where
		I: IntoIterator<Item = (V, L)>,
		V: Into<String>,
		L: Into<String>,
	{
		for (value, label) in choices {
			self = self.add_choice(value, label);
		}
		self
	}

	/// Record field the filter compares
	pub fn field_name(&self) -> &str {
		&self.field
	}

	/// Title shown above the select
	pub fn title(&self) -> &str {
		&self.title
	}

	/// Declared options, in order
	pub fn options(&self) -> &[ChoiceOption] {
		&self.options
	}

	/// Whether `value` is one of the declared option values
	pub fn has_option(&self, value: &str) -> bool {
		self.options.iter().any(|o| o.value == value)
	}
}

/// Filters a view offers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
	date_field: Option<String>,
	search_fields: Vec<SearchField>,
	choice_filters: Vec<ChoiceFilter>,
}

impl FilterConfig {
	/// A configuration with no filters
	pub fn new() -> Self {
		Self::default()
	}

	/// Designate the field year/month toggles read
	pub fn date_field(mut self, field: impl Into<String>) -> Self {
		self.date_field = Some(field.into());
		self
	}

	/// Add a search control
	pub fn search(mut self, field: SearchField) -> Self {
		self.search_fields.push(field);
		self
	}

	/// Add an enumerated filter
	pub fn choice(mut self, filter: ChoiceFilter) -> Self {
		self.choice_filters.push(filter);
		self
	}

	/// Designated date field, if any
	pub fn designated_date_field(&self) -> Option<&str> {
		self.date_field.as_deref()
	}

	/// Declared search controls
	pub fn search_fields(&self) -> &[SearchField] {
		&self.search_fields
	}

	/// Declared enumerated filters
	pub fn choice_filters(&self) -> &[ChoiceFilter] {
		&self.choice_filters
	}

	/// Search control named `name`
	pub fn search_field(&self, name: &str) -> Option<&SearchField> {
		self.search_fields.iter().find(|f| f.name == name)
	}

	/// Enumerated filter over `field`
	pub fn choice_filter(&self, field: &str) -> Option<&ChoiceFilter> {
		self.choice_filters.iter().find(|f| f.field == field)
	}

	/// Distinct years present in the designated date field, newest first
	///
	/// Records whose date cannot be parsed are skipped.
	pub fn available_years<R: Record>(&self, records: &[R]) -> Vec<i32> {
		let Some(field) = self.date_field.as_deref() else {
			return Vec::new();
		};
		let years: BTreeSet<i32> = records
			.iter()
			.filter_map(|r| r.field(field).to_calendar_day())
			.map(|day| day.year())
			.collect();
		years.into_iter().rev().collect()
	}

	/// Check that `values` only uses filters this configuration declares
	pub fn validate(&self, values: &FilterValues) -> Result<()> {
		if (values.year.is_some() || values.month.is_some()) && self.date_field.is_none() {
			return Err(TableError::NoDateField);
		}

		for (name, input) in &values.search {
			let field = self
				.search_field(name)
				.ok_or_else(|| TableError::UnknownSearchField(name.clone()))?;
			let fits = matches!(
				(&field.kind, input),
				(SearchKind::Text, SearchInput::Text(_))
					| (SearchKind::ExactDate, SearchInput::Date(_))
					| (SearchKind::DateRange { .. }, SearchInput::Range { .. })
			);
			if !fits {
				return Err(TableError::SearchKindMismatch {
					field: name.clone(),
					expected: field.kind.expected_input(),
				});
			}
			if let SearchInput::Range {
				from: Some(from),
				to: Some(to),
			} = input
				&& from > to
			{
				return Err(TableError::InvertedRange(name.clone()));
			}
		}

		for (field, value) in &values.choices {
			let filter = self
				.choice_filter(field)
				.ok_or_else(|| TableError::UnknownChoiceFilter(field.clone()))?;
			if !value.is_empty() && !filter.has_option(value) {
				return Err(TableError::InvalidChoice {
					field: field.clone(),
					value: value.clone(),
				});
			}
		}

		Ok(())
	}

	/// Validate `values` and turn the active ones into predicates
	///
	/// Predicate order is fixed: year, month, search fields in declaration
	/// order, then enumerated filters in declaration order.
	pub fn compile(&self, values: &FilterValues) -> Result<CompiledFilter> {
		self.validate(values)?;

		let mut predicates = Vec::new();
		if let Some(date_field) = &self.date_field {
			if let Some(year) = values.year {
				predicates.push(Predicate::Year {
					field: date_field.clone(),
					year,
				});
			}
			if let Some(month) = values.month {
				predicates.push(Predicate::Month {
					field: date_field.clone(),
					month: month.number_from_month(),
				});
			}
		}

		for field in &self.search_fields {
			let Some(input) = values.search.get(&field.name) else {
				continue;
			};
			let target = field.target_field().to_string();
			match input {
				SearchInput::Text(term) if term.is_empty() => {}
				SearchInput::Text(term) => predicates.push(Predicate::Text {
					field: target,
					needle: term.clone(),
				}),
				SearchInput::Date(day) => predicates.push(Predicate::ExactDate {
					field: target,
					day: *day,
				}),
				SearchInput::Range { from: None, to: None } => {}
				SearchInput::Range { from, to } => predicates.push(Predicate::DateRange {
					field: target,
					from: *from,
					to: *to,
				}),
			}
		}

		for filter in &self.choice_filters {
			if let Some(value) = values.choices.get(&filter.field)
				&& !value.is_empty()
			{
				predicates.push(Predicate::Choice {
					field: filter.field.clone(),
					value: value.clone(),
				});
			}
		}

		Ok(CompiledFilter { predicates })
	}
}

/// Value entered into a search control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchInput {
	/// Search term for a text control
	Text(String),
	/// Day for an exact-date control
	Date(NaiveDate),
	/// Bounds for a range control; a missing bound leaves that side open
	Range {
		/// Earliest matching day
		from: Option<NaiveDate>,
		/// Latest matching day
		to: Option<NaiveDate>,
	},
}

impl SearchInput {
	/// Text term
	pub fn text(term: impl Into<String>) -> Self {
		SearchInput::Text(term.into())
	}

	/// Range with both bounds optional
	pub fn range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
		SearchInput::Range { from, to }
	}
}

/// Current runtime filter values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterValues {
	/// Year toggle
	pub year: Option<i32>,
	/// Month toggle
	pub month: Option<Month>,
	/// Search inputs by control name
	pub search: BTreeMap<String, SearchInput>,
	/// Enumerated filter values by field; the empty string means no filter
	pub choices: BTreeMap<String, String>,
}

impl FilterValues {
	/// No active filters
	pub fn new() -> Self {
		Self::default()
	}

	/// With a year
	pub fn with_year(mut self, year: i32) -> Self {
		self.year = Some(year);
		self
	}

	/// With a month
	pub fn with_month(mut self, month: Month) -> Self {
		self.month = Some(month);
		self
	}

	/// With a month from a zero-based index (0 = January)
	///
	/// # Examples
	///
	/// ```
	/// use chrono::Month;
	/// use gridline_tables::filter::FilterValues;
	///
	/// let values = FilterValues::new().with_month_index(0).unwrap();
	/// assert_eq!(values.month, Some(Month::January));
	/// assert!(FilterValues::new().with_month_index(12).is_err());
	/// ```
	pub fn with_month_index(mut self, index: u32) -> Result<Self> {
		self.month = Some(month_from_index(index)?);
		Ok(self)
	}

	/// With a search input
	pub fn with_search(mut self, name: impl Into<String>, input: SearchInput) -> Self {
		self.search.insert(name.into(), input);
		self
	}

	/// With an enumerated filter value
	pub fn with_choice(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
		self.choices.insert(field.into(), value.into());
		self
	}

	/// Whether nothing would be filtered out
	pub fn is_empty(&self) -> bool {
		self.year.is_none()
			&& self.month.is_none()
			&& self.search.values().all(|input| match input {
				SearchInput::Text(term) => term.is_empty(),
				SearchInput::Date(_) => false,
				SearchInput::Range { from, to } => from.is_none() && to.is_none(),
			}) && self.choices.values().all(String::is_empty)
	}
}

/// Convert a zero-based month index (0 = January) to a [`Month`]
pub fn month_from_index(index: u32) -> Result<Month> {
	index
		.checked_add(1)
		.and_then(|n| u8::try_from(n).ok())
		.and_then(|n| Month::try_from(n).ok())
		.ok_or(TableError::InvalidMonth(index))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
	Year {
		field: String,
		year: i32,
	},
	Month {
		field: String,
		month: u32,
	},
	Text {
		field: String,
		needle: String,
	},
	ExactDate {
		field: String,
		day: NaiveDate,
	},
	DateRange {
		field: String,
		from: Option<NaiveDate>,
		to: Option<NaiveDate>,
	},
	Choice {
		field: String,
		value: String,
	},
}

impl Predicate {
	fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
		match self {
			Predicate::Year { field, year } => record
				.field(field)
				.to_calendar_day()
				.is_some_and(|day| day.year() == *year),
			Predicate::Month { field, month } => record
				.field(field)
				.to_calendar_day()
				.is_some_and(|day| day.month() == *month),
			Predicate::Text { field, needle } => {
				contains_ignore_case(&record.field(field).display(), needle)
			}
			Predicate::ExactDate { field, day } => {
				record.field(field).to_calendar_day() == Some(*day)
			}
			Predicate::DateRange { field, from, to } => {
				record.field(field).to_calendar_day().is_some_and(|day| {
					from.is_none_or(|from| day >= from) && to.is_none_or(|to| day <= to)
				})
			}
			Predicate::Choice { field, value } => record.field(field).display() == value.as_str(),
		}
	}
}

/// Active predicates ready to evaluate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFilter {
	predicates: Vec<Predicate>,
}

impl CompiledFilter {
	/// Whether `record` satisfies every predicate
	///
	/// Stops at the first failing predicate.
	pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
		self.predicates.iter().all(|p| p.matches(record))
	}

	/// Number of active predicates
	pub fn len(&self) -> usize {
		self.predicates.len()
	}

	/// True when every record passes
	pub fn is_empty(&self) -> bool {
		self.predicates.is_empty()
	}
}

/// Records satisfying every active filter, in input order
///
/// # Examples
///
/// ```
/// use gridline_core::FieldMap;
/// use gridline_tables::filter::{FilterConfig, FilterValues, filter};
///
/// let records = vec![
///     FieldMap::new(1).with("monto", 100).with("fecha", "2024-01-05"),
///     FieldMap::new(2).with("monto", 200).with("fecha", "2024-02-10"),
/// ];
/// let config = FilterConfig::new().date_field("fecha");
/// let values = FilterValues::new().with_month_index(0).unwrap();
///
/// let january = filter(&records, &config, &values).unwrap();
/// assert_eq!(january.len(), 1);
/// ```
pub fn filter<'a, R: Record>(
	records: &'a [R],
	config: &FilterConfig,
	values: &FilterValues,
) -> Result<Vec<&'a R>> {
	let compiled = config.compile(values)?;
	Ok(records.iter().filter(|r| compiled.matches(*r)).collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use gridline_core::FieldMap;
	use rstest::{fixture, rstest};

	fn day(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn ids(rows: &[&FieldMap]) -> Vec<String> {
		rows.iter().map(|r| r.id().to_string()).collect()
	}

	#[fixture]
	fn records() -> Vec<FieldMap> {
		vec![
			FieldMap::new(1)
				.with("cliente", "Transportes Norte")
				.with("fecha", "2024-01-05")
				.with("fecha_pago", "2024-03-01")
				.with("estado", "pagado"),
			FieldMap::new(2)
				.with("cliente", "Fletes del Sur")
				.with("fecha", "2024-02-10")
				.with("fecha_pago", "2024-01-31")
				.with("estado", "pendiente"),
			FieldMap::new(3)
				.with("cliente", "norte express")
				.with("fecha", "no es fecha")
				.with("estado", "pagado"),
			FieldMap::new(4)
				.with("cliente", "Carga Libre")
				.with("fecha", "2023-01-20T09:15:00")
				.with("estado", "pagado"),
		]
	}

	#[fixture]
	fn config() -> FilterConfig {
		FilterConfig::new()
			.date_field("fecha")
			.search(SearchField::text("cliente", "Cliente"))
			.search(SearchField::exact_date("fecha", "Fecha"))
			.search(SearchField::date_range("periodo", "Periodo de pago", "fecha_pago"))
			.choice(
				ChoiceFilter::new("estado", "Estado")
					.with_choices([("pagado", "Pagado"), ("pendiente", "Pendiente")]),
			)
	}

	#[rstest]
	fn test_no_values_keeps_everything(records: Vec<FieldMap>, config: FilterConfig) {
		let result = filter(&records, &config, &FilterValues::new()).unwrap();
		assert_eq!(result.len(), records.len());
	}

	#[rstest]
	fn test_unparseable_date_fails_closed(records: Vec<FieldMap>, config: FilterConfig) {
		// Arrange
		let values = FilterValues::new().with_year(2024);

		// Act
		let result = filter(&records, &config, &values).unwrap();

		// Assert
		assert_eq!(ids(&result), vec!["1", "2"]);
	}

	#[rstest]
	fn test_month_spans_years(records: Vec<FieldMap>, config: FilterConfig) {
		let values = FilterValues::new().with_month(Month::January);
		let result = filter(&records, &config, &values).unwrap();
		assert_eq!(ids(&result), vec!["1", "4"]);
	}

	#[rstest]
	#[case("NORTE", vec!["1", "3"])]
	#[case("sur", vec!["2"])]
	#[case("", vec!["1", "2", "3", "4"])]
	#[case("zzz", vec![])]
	fn test_text_search(
		records: Vec<FieldMap>,
		config: FilterConfig,
		#[case] term: &str,
		#[case] expected: Vec<&str>,
	) {
		let values = FilterValues::new().with_search("cliente", SearchInput::text(term));
		let result = filter(&records, &config, &values).unwrap();
		assert_eq!(ids(&result), expected);
	}

	#[rstest]
	fn test_text_search_ignores_case_of_accented_letters(config: FilterConfig) {
		let records = vec![
			FieldMap::new(1).with("cliente", "PÉREZ HERMANOS"),
			FieldMap::new(2).with("cliente", "Perez y Asociados"),
		];
		let values = FilterValues::new().with_search("cliente", SearchInput::text("pérez"));

		let result = filter(&records, &config, &values).unwrap();

		assert_eq!(ids(&result), vec!["1"]);
	}

	#[rstest]
	fn test_exact_date_ignores_time(records: Vec<FieldMap>, config: FilterConfig) {
		let values = FilterValues::new().with_search("fecha", SearchInput::Date(day(2023, 1, 20)));
		let result = filter(&records, &config, &values).unwrap();
		assert_eq!(ids(&result), vec!["4"]);
	}

	#[rstest]
	fn test_range_reads_underlying_field(records: Vec<FieldMap>, config: FilterConfig) {
		// Arrange: bounds apply to fecha_pago, not fecha
		let values = FilterValues::new().with_search(
			"periodo",
			SearchInput::range(Some(day(2024, 1, 1)), Some(day(2024, 1, 31))),
		);

		// Act
		let result = filter(&records, &config, &values).unwrap();

		// Assert
		assert_eq!(ids(&result), vec!["2"]);
	}

	#[rstest]
	fn test_open_ended_range(records: Vec<FieldMap>, config: FilterConfig) {
		let values = FilterValues::new()
			.with_search("periodo", SearchInput::range(Some(day(2024, 2, 1)), None));
		let result = filter(&records, &config, &values).unwrap();
		assert_eq!(ids(&result), vec!["1"]);
	}

	#[rstest]
	fn test_choice_exact_match(records: Vec<FieldMap>, config: FilterConfig) {
		let values = FilterValues::new().with_choice("estado", "pendiente");
		let result = filter(&records, &config, &values).unwrap();
		assert_eq!(ids(&result), vec!["2"]);
	}

	#[rstest]
	fn test_empty_choice_is_inactive(records: Vec<FieldMap>, config: FilterConfig) {
		let values = FilterValues::new().with_choice("estado", "");
		assert!(config.compile(&values).unwrap().is_empty());
		assert_eq!(filter(&records, &config, &values).unwrap().len(), 4);
	}

	#[rstest]
	fn test_predicates_are_conjunctive(records: Vec<FieldMap>, config: FilterConfig) {
		let values = FilterValues::new()
			.with_search("cliente", SearchInput::text("norte"))
			.with_choice("estado", "pagado")
			.with_year(2024);
		let result = filter(&records, &config, &values).unwrap();
		assert_eq!(ids(&result), vec!["1"]);
	}

	#[rstest]
	#[case(FilterValues::new().with_search("nope", SearchInput::text("x")), TableError::UnknownSearchField("nope".into()))]
	#[case(FilterValues::new().with_choice("tipo", "a"), TableError::UnknownChoiceFilter("tipo".into()))]
	#[case(
		FilterValues::new().with_choice("estado", "cancelado"),
		TableError::InvalidChoice { field: "estado".into(), value: "cancelado".into() }
	)]
	#[case(
		FilterValues::new().with_search("fecha", SearchInput::text("2024")),
		TableError::SearchKindMismatch { field: "fecha".into(), expected: "date" }
	)]
	#[case(
		FilterValues::new().with_search("periodo", SearchInput::range(Some(day(2024, 2, 1)), Some(day(2024, 1, 1)))),
		TableError::InvertedRange("periodo".into())
	)]
	fn test_invalid_values_rejected(
		config: FilterConfig,
		#[case] values: FilterValues,
		#[case] expected: TableError,
	) {
		assert_eq!(config.validate(&values), Err(expected));
	}

	#[rstest]
	fn test_year_without_date_field() {
		let config = FilterConfig::new();
		let values = FilterValues::new().with_year(2024);
		assert_eq!(config.validate(&values), Err(TableError::NoDateField));
	}

	#[rstest]
	fn test_available_years(records: Vec<FieldMap>, config: FilterConfig) {
		assert_eq!(config.available_years(&records), vec![2024, 2023]);
	}

	#[rstest]
	#[case(0, Month::January)]
	#[case(11, Month::December)]
	fn test_month_index(#[case] index: u32, #[case] month: Month) {
		assert_eq!(month_from_index(index), Ok(month));
	}

	#[rstest]
	fn test_values_is_empty() {
		assert!(FilterValues::new().with_search("cliente", SearchInput::text("")).is_empty());
		assert!(!FilterValues::new().with_year(2024).is_empty());
	}
}
