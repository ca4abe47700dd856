//! Spreadsheet export
//!
//! Export happens in two steps. [`SpreadsheetExporter::build_sheet`] turns
//! records and columns into a [`SheetModel`]: exportable headers, typed cells
//! and column widths. [`SpreadsheetExporter::render`] then writes that model
//! as a single-sheet XLSX workbook. Neither step performs I/O; handing the
//! bytes to the user is the job of an [`ArtifactSink`](crate::sink::ArtifactSink).

use crate::error::{ExportError, ExportResult};
use chrono::{Datelike, Local, NaiveDate};
use gridline_core::{AccessorClass, BoxedColumn, Column, ExportSettings, Value};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use serde::{Deserialize, Serialize};

/// MIME type of the produced workbooks
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 50;
const MAX_SHEET_NAME_LEN: usize = 31;

/// One typed cell of the export sheet
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
	/// Nothing written
	Blank,
	/// Plain text
	Text(String),
	/// Plain number
	Number(f64),
	/// Spreadsheet boolean
	Bool(bool),
	/// Number written with the currency format
	Currency(f64),
	/// Calendar date written with the date format
	Date(NaiveDate),
}

impl ExportCell {
	fn from_raw(value: Value) -> Self {
		match value {
			Value::Null => ExportCell::Blank,
			Value::Bool(b) => ExportCell::Bool(b),
			Value::Int(i) => ExportCell::Number(i as f64),
			Value::Float(f) if f.is_finite() => ExportCell::Number(f),
			Value::Date(d) => ExportCell::Date(d),
			other => ExportCell::Text(other.display().into_owned()),
		}
	}

	/// Characters the cell takes up once formatted
	fn display_len(&self, settings: &ExportSettings) -> usize {
		match self {
			ExportCell::Blank => 0,
			ExportCell::Text(s) => s.chars().count(),
			ExportCell::Number(n) => n.to_string().len(),
			ExportCell::Bool(b) => if *b { 4 } else { 5 },
			ExportCell::Currency(n) => format_currency(*n, &settings.currency_symbol).chars().count(),
			ExportCell::Date(d) => d.format(&settings.date_display).to_string().chars().count(),
		}
	}
}

/// Export sheet before serialization
#[derive(Debug, Clone, PartialEq)]
pub struct SheetModel {
	/// Worksheet name
	pub sheet_name: String,
	/// Accessor key of each exported column
	pub keys: Vec<String>,
	/// Header row
	pub headers: Vec<String>,
	/// Data rows, one cell per exported column
	pub rows: Vec<Vec<ExportCell>>,
	/// Column widths in characters
	pub widths: Vec<usize>,
}

impl SheetModel {
	/// Number of exported columns
	pub fn column_count(&self) -> usize {
		self.headers.len()
	}

	/// Cells of the column with accessor `key`
	pub fn column(&self, key: &str) -> Option<Vec<&ExportCell>> {
		let index = self.keys.iter().position(|k| k == key)?;
		Some(self.rows.iter().map(|row| &row[index]).collect())
	}
}

/// Finished export file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
	/// Suggested file name
	pub filename: String,
	/// Workbook bytes
	pub bytes: Vec<u8>,
	/// MIME type
	pub mime_type: String,
	/// Number of data rows
	pub row_count: usize,
}

impl ExportArtifact {
	/// Size in bytes
	pub fn size_bytes(&self) -> usize {
		self.bytes.len()
	}
}

/// Builds XLSX exports from records and columns
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use gridline_admin::export::{ExportCell, SpreadsheetExporter};
/// use gridline_core::{field_column, BoxedColumn, ExportSettings, FieldMap};
///
/// let columns: Vec<BoxedColumn<FieldMap>> = vec![
///     Box::new(field_column("Acciones", "Acciones")),
///     Box::new(field_column("monto", "Monto")),
/// ];
/// let records = vec![FieldMap::new(1).with("monto", 1500)];
///
/// let exporter = SpreadsheetExporter::new(ExportSettings::default())
///     .with_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
/// let sheet = exporter.build_sheet(&records, &columns, "Ingresos").unwrap();
///
/// assert_eq!(sheet.headers, vec!["Monto"]);
/// assert_eq!(sheet.rows[0][0], ExportCell::Currency(1500.0));
/// assert_eq!(exporter.filename("Ingresos", None), "Ingresos-2024-03-01.xlsx");
/// ```
#[derive(Debug, Clone)]
pub struct SpreadsheetExporter {
	settings: ExportSettings,
	date: Option<NaiveDate>,
}

impl SpreadsheetExporter {
	/// Exporter stamping files with today's local date
	pub fn new(settings: ExportSettings) -> Self {
		Self {
			settings,
			date: None,
		}
	}

	/// Use a fixed export date
	pub fn with_date(mut self, date: NaiveDate) -> Self {
		self.date = Some(date);
		self
	}

	/// Export settings
	pub fn settings(&self) -> &ExportSettings {
		&self.settings
	}

	/// Date written into file names
	pub fn export_date(&self) -> NaiveDate {
		self.date.unwrap_or_else(|| Local::now().date_naive())
	}

	/// `<title>-<date>.xlsx`, or `<title>-<subset>-<date>.xlsx` for partial exports
	pub fn filename(&self, title: &str, subset_label: Option<&str>) -> String {
		let date = self.export_date().format("%Y-%m-%d");
		let title = sanitize_file_stem(title);
		match subset_label {
			Some(label) => format!("{}-{}-{}.xlsx", title, sanitize_file_stem(label), date),
			None => format!("{}-{}.xlsx", title, date),
		}
	}

	/// Build the sheet model without serializing it
	pub fn build_sheet<'a, R, I>(
		&self,
		records: I,
		columns: &[BoxedColumn<R>],
		title: &str,
	) -> ExportResult<SheetModel>
	where
		R: 'a,
		I: IntoIterator<Item = &'a R>,
	{
		let exported: Vec<&BoxedColumn<R>> = columns
			.iter()
			.filter(|c| !self.settings.is_denied(c.header(), c.key()))
			.collect();
		if exported.is_empty() {
			return Err(ExportError::NoColumns);
		}

		let classes: Vec<Option<AccessorClass>> =
			exported.iter().map(|c| self.settings.classify(c.key())).collect();

		let rows: Vec<Vec<ExportCell>> = records
			.into_iter()
			.map(|row| {
				exported
					.iter()
					.zip(&classes)
					.map(|(column, class)| self.cell(column, *class, row))
					.collect()
			})
			.collect();

		let headers: Vec<String> = exported.iter().map(|c| c.header().to_string()).collect();
		let widths = headers
			.iter()
			.enumerate()
			.map(|(i, header)| {
				let widest = rows
					.iter()
					.map(|row| row[i].display_len(&self.settings))
					.chain(std::iter::once(header.chars().count()))
					.max()
					.unwrap_or(0);
				(widest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
			})
			.collect();

		Ok(SheetModel {
			sheet_name: sanitize_sheet_name(title),
			keys: exported.iter().map(|c| c.key().to_string()).collect(),
			headers,
			rows,
			widths,
		})
	}

	fn cell<R>(&self, column: &BoxedColumn<R>, class: Option<AccessorClass>, row: &R) -> ExportCell {
		let raw = column.value(row);
		if raw.is_blank() {
			if column.has_renderer() {
				let rendered = column.render(row);
				if !rendered.trim().is_empty() {
					return ExportCell::Text(rendered);
				}
			}
			return ExportCell::Blank;
		}

		match class {
			Some(AccessorClass::Currency) => match raw.as_f64() {
				Some(amount) => ExportCell::Currency(amount),
				None => ExportCell::from_raw(raw),
			},
			Some(AccessorClass::Date) => match raw.to_calendar_day() {
				Some(day) => ExportCell::Date(day),
				None => ExportCell::from_raw(raw),
			},
			Some(AccessorClass::BooleanEnum) => match raw.as_bool() {
				Some(true) => ExportCell::Text(self.settings.active_label.clone()),
				Some(false) => ExportCell::Text(self.settings.inactive_label.clone()),
				None => ExportCell::from_raw(raw),
			},
			None => ExportCell::from_raw(raw),
		}
	}

	/// Serialize a sheet model to XLSX bytes
	pub fn render(&self, model: &SheetModel) -> ExportResult<Vec<u8>> {
		let header_format = Format::new().set_bold();
		let currency_format = Format::new().set_num_format(&self.settings.currency_format);
		let date_format = Format::new().set_num_format(&self.settings.date_format);

		let mut workbook = Workbook::new();
		let worksheet = workbook.add_worksheet();
		worksheet.set_name(&model.sheet_name)?;

		for (col, header) in model.headers.iter().enumerate() {
			let col = col as u16;
			worksheet.write_string_with_format(0, col, header, &header_format)?;
			worksheet.set_column_width(col, model.widths[col as usize] as f64)?;
		}

		for (index, cells) in model.rows.iter().enumerate() {
			let row = index as u32 + 1;
			for (col, cell) in cells.iter().enumerate() {
				let col = col as u16;
				match cell {
					ExportCell::Blank => {}
					ExportCell::Text(text) => {
						worksheet.write_string(row, col, text)?;
					}
					ExportCell::Number(n) => {
						worksheet.write_number(row, col, *n)?;
					}
					ExportCell::Bool(b) => {
						worksheet.write_boolean(row, col, *b)?;
					}
					ExportCell::Currency(n) => {
						worksheet.write_number_with_format(row, col, *n, &currency_format)?;
					}
					ExportCell::Date(day) => {
						let date = ExcelDateTime::from_ymd(
							day.year() as u16,
							day.month() as u8,
							day.day() as u8,
						)?;
						worksheet.write_datetime_with_format(row, col, &date, &date_format)?;
					}
				}
			}
		}

		Ok(workbook.save_to_buffer()?)
	}

	/// Build, render and name an export
	///
	/// Pass `subset_label` for partial exports.
	pub fn export<'a, R, I>(
		&self,
		records: I,
		columns: &[BoxedColumn<R>],
		title: &str,
		subset_label: Option<&str>,
	) -> ExportResult<ExportArtifact>
	where
		R: 'a,
		I: IntoIterator<Item = &'a R>,
	{
		let model = self.build_sheet(records, columns, title)?;
		let bytes = self.render(&model)?;
		let artifact = ExportArtifact {
			filename: self.filename(title, subset_label),
			bytes,
			mime_type: XLSX_MIME_TYPE.to_string(),
			row_count: model.rows.len(),
		};
		tracing::info!(
			filename = %artifact.filename,
			rows = artifact.row_count,
			columns = model.column_count(),
			bytes = artifact.size_bytes(),
			"spreadsheet export built"
		);
		Ok(artifact)
	}
}

/// Format an amount with a currency symbol, thousands separators and two decimals
///
/// # Examples
///
/// ```
/// use gridline_admin::export::format_currency;
///
/// assert_eq!(format_currency(1234567.891, "$"), "$1,234,567.89");
/// assert_eq!(format_currency(-50.0, "$"), "-$50.00");
/// ```
pub fn format_currency(amount: f64, symbol: &str) -> String {
	let fixed = format!("{:.2}", amount.abs());
	let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

	let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
	for (i, digit) in whole.chars().enumerate() {
		if i > 0 && (whole.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(digit);
	}

	let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
	format!("{sign}{symbol}{grouped}.{cents}")
}

/// Make a title usable as a worksheet name
///
/// Excel rejects `[]:*?/\`, leading or trailing apostrophes, and names over
/// 31 characters.
pub fn sanitize_sheet_name(title: &str) -> String {
	let cleaned: String = title
		.chars()
		.map(|ch| match ch {
			'[' | ']' | ':' | '*' | '?' | '/' | '\\' => ' ',
			other => other,
		})
		.collect();
	let trimmed: String = cleaned
		.trim()
		.trim_matches('\'')
		.chars()
		.take(MAX_SHEET_NAME_LEN)
		.collect();
	let trimmed = trimmed.trim_end().to_string();
	if trimmed.is_empty() {
		"Sheet1".to_string()
	} else {
		trimmed
	}
}

fn sanitize_file_stem(text: &str) -> String {
	text.trim()
		.chars()
		.map(|ch| match ch {
			'/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
			c if c.is_control() => '-',
			c => c,
		})
		.collect()
}
