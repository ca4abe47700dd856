//! Engine settings
//!
//! Settings are plain serde structs with defaults tuned for the back-office
//! dashboard (Spanish field names, peso amounts, `dd/mm/yyyy` dates). Every
//! section can be overridden from TOML:
//!
//! ```toml
//! [pagination]
//! default_page_size = 25
//!
//! [export]
//! currency_format = "\"€\"#,##0.00"
//! currency_symbol = "€"
//!
//! [targets.titles]
//! "Pagos a Conductores" = "pagos_conductores"
//! ```

use crate::error::{CoreError, CoreResult};
use crate::text::fold;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Root settings object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
	/// Page sizing
	pub pagination: PaginationSettings,
	/// Spreadsheet export formats, labels and accessor classes
	pub export: ExportSettings,
	/// Delete-target resolution tables
	pub targets: TargetSettings,
}

impl GridSettings {
	/// Parse settings from TOML text, filling gaps with defaults
	///
	/// # Examples
	///
	/// ```
	/// use gridline_core::GridSettings;
	///
	/// let settings = GridSettings::from_toml_str("[pagination]\ndefault_page_size = 25\n").unwrap();
	/// assert_eq!(settings.pagination.default_page_size, 25);
	/// assert_eq!(settings.export.active_label, "Activo");
	/// ```
	pub fn from_toml_str(text: &str) -> CoreResult<Self> {
		let settings: GridSettings = toml::from_str(text)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Read and parse a TOML settings file
	pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
		let text = std::fs::read_to_string(path)?;
		Self::from_toml_str(&text)
	}

	/// Check cross-field constraints
	pub fn validate(&self) -> CoreResult<()> {
		let pagination = &self.pagination;
		if pagination.default_page_size == 0 {
			return Err(CoreError::InvalidSetting {
				field: "pagination.default_page_size".to_string(),
				reason: "must be at least 1".to_string(),
			});
		}
		if pagination.default_page_size > pagination.max_page_size {
			return Err(CoreError::InvalidSetting {
				field: "pagination.default_page_size".to_string(),
				reason: format!("exceeds max_page_size ({})", pagination.max_page_size),
			});
		}
		if self.export.active_label.is_empty() || self.export.inactive_label.is_empty() {
			return Err(CoreError::InvalidSetting {
				field: "export.active_label".to_string(),
				reason: "boolean labels must not be empty".to_string(),
			});
		}
		Ok(())
	}
}

/// Page sizing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
	/// Rows per page for a fresh view
	pub default_page_size: usize,
	/// Largest page size a caller may request
	pub max_page_size: usize,
}

impl Default for PaginationSettings {
	fn default() -> Self {
		Self {
			default_page_size: 10,
			max_page_size: 500,
		}
	}
}

/// Semantic class an export column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorClass {
	/// Money amounts
	Currency,
	/// Calendar dates
	Date,
	/// Active/inactive flags
	BooleanEnum,
}

/// Spreadsheet export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
	/// Excel number format for currency cells
	pub currency_format: String,
	/// Symbol used when estimating rendered currency width
	pub currency_symbol: String,
	/// Excel number format for date cells
	pub date_format: String,
	/// chrono pattern equivalent to `date_format`
	pub date_display: String,
	/// Label written for `true` in boolean-enum columns
	pub active_label: String,
	/// Label written for `false` in boolean-enum columns
	pub inactive_label: String,
	/// Middle segment of file names for selection exports
	pub subset_label: String,
	/// Headers or accessors never exported (action buttons, audit columns)
	pub denylist: Vec<String>,
	/// Accessors exported as currency
	pub currency_fields: Vec<String>,
	/// Accessors exported as dates
	pub date_fields: Vec<String>,
	/// Accessors exported as active/inactive labels
	pub boolean_fields: Vec<String>,
}

impl Default for ExportSettings {
	fn default() -> Self {
		Self {
			currency_format: "\"$\"#,##0.00".to_string(),
			currency_symbol: "$".to_string(),
			date_format: "dd/mm/yyyy".to_string(),
			date_display: "%d/%m/%Y".to_string(),
			active_label: "Activo".to_string(),
			inactive_label: "Inactivo".to_string(),
			subset_label: "seleccion".to_string(),
			denylist: strings(&["Acciones", "actions", "color", "created_by", "updated_by"]),
			currency_fields: strings(&[
				"monto",
				"importe",
				"total",
				"subtotal",
				"iva",
				"isr",
				"retencion",
				"precio",
				"costo",
				"tarifa",
				"saldo",
			]),
			date_fields: strings(&[
				"fecha",
				"fecha_pago",
				"fecha_emision",
				"fecha_inicio",
				"fecha_fin",
				"fecha_vencimiento",
				"created_at",
				"updated_at",
			]),
			boolean_fields: strings(&["activo", "estado", "disponible", "is_active"]),
		}
	}
}

impl ExportSettings {
	/// Whether a column is excluded from exports
	///
	/// Matches header or accessor against the denylist, ignoring case.
	pub fn is_denied(&self, header: &str, key: &str) -> bool {
		self.denylist
			.iter()
			.any(|entry| entry.eq_ignore_ascii_case(header) || entry.eq_ignore_ascii_case(key))
	}

	/// Semantic class of an accessor, if any
	///
	/// # Examples
	///
	/// ```
	/// use gridline_core::{AccessorClass, ExportSettings};
	///
	/// let export = ExportSettings::default();
	/// assert_eq!(export.classify("monto"), Some(AccessorClass::Currency));
	/// assert_eq!(export.classify("fecha"), Some(AccessorClass::Date));
	/// assert_eq!(export.classify("activo"), Some(AccessorClass::BooleanEnum));
	/// assert_eq!(export.classify("nombre"), None);
	/// ```
	pub fn classify(&self, key: &str) -> Option<AccessorClass> {
		let matches = |list: &[String]| list.iter().any(|k| k == key);
		if matches(&self.currency_fields) {
			Some(AccessorClass::Currency)
		} else if matches(&self.date_fields) {
			Some(AccessorClass::Date)
		} else if matches(&self.boolean_fields) {
			Some(AccessorClass::BooleanEnum)
		} else {
			None
		}
	}
}

/// One keyword heuristic: titles containing `keyword` map to `collection`
///
/// The keyword is folded both when built in code and when loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawKeywordRule")]
pub struct KeywordRule {
	/// Accent-folded, lower-case fragment searched for in the title
	pub keyword: String,
	/// Collection the fragment points at
	pub collection: String,
}

impl KeywordRule {
	/// Create a rule; the keyword is folded on construction
	pub fn new(keyword: impl AsRef<str>, collection: impl Into<String>) -> Self {
		Self {
			keyword: fold(keyword.as_ref()),
			collection: collection.into(),
		}
	}
}

#[derive(Deserialize)]
struct RawKeywordRule {
	keyword: String,
	collection: String,
}

impl From<RawKeywordRule> for KeywordRule {
	fn from(raw: RawKeywordRule) -> Self {
		KeywordRule::new(raw.keyword, raw.collection)
	}
}

/// Tables used to turn a page title into a storage collection name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
	/// Exact page title to collection name
	pub titles: BTreeMap<String, String>,
	/// Ordered keyword fallbacks; the first match wins
	pub keywords: Vec<KeywordRule>,
}

impl Default for TargetSettings {
	fn default() -> Self {
		let titles = [
			("Clientes", "clientes"),
			("Conductores", "conductores"),
			("Vehículos", "vehiculos"),
			("Viajes", "viajes"),
			("Ingresos", "ingresos"),
			("Gastos", "gastos"),
			("Retenciones", "retenciones"),
		]
		.into_iter()
		.map(|(title, collection)| (title.to_string(), collection.to_string()))
		.collect();

		let keywords = vec![
			KeywordRule::new("cliente", "clientes"),
			KeywordRule::new("conductor", "conductores"),
			KeywordRule::new("chofer", "conductores"),
			KeywordRule::new("vehic", "vehiculos"),
			KeywordRule::new("viaje", "viajes"),
			KeywordRule::new("ingreso", "ingresos"),
			KeywordRule::new("gasto", "gastos"),
			KeywordRule::new("retenc", "retenciones"),
		];

		Self { titles, keywords }
	}
}

fn strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	fn test_defaults_validate() {
		// Arrange
		let settings = GridSettings::default();

		// Act & Assert
		assert!(settings.validate().is_ok());
		assert_eq!(settings.pagination.default_page_size, 10);
	}

	#[rstest]
	fn test_toml_keywords_are_folded() {
		// Arrange
		let text = r#"
[[targets.keywords]]
keyword = "Bitácora"
collection = "bitacoras"
"#;

		// Act
		let settings = GridSettings::from_toml_str(text).unwrap();

		// Assert
		assert_eq!(
			settings.targets.keywords,
			vec![KeywordRule::new("bitacora", "bitacoras")]
		);
		assert_eq!(settings.targets.keywords[0].keyword, "bitacora");
	}

	#[rstest]
	fn test_partial_toml_keeps_other_defaults() {
		// Arrange
		let text = r#"
[export]
active_label = "Sí"
inactive_label = "No"

[targets.titles]
"Pagos a Conductores" = "pagos_conductores"
"#;

		// Act
		let settings = GridSettings::from_toml_str(text).unwrap();

		// Assert
		assert_eq!(settings.export.active_label, "Sí");
		assert_eq!(settings.export.currency_symbol, "$");
		assert_eq!(
			settings.targets.titles.get("Pagos a Conductores"),
			Some(&"pagos_conductores".to_string())
		);
		// A table given in TOML replaces the default table wholesale.
		assert_eq!(settings.targets.titles.len(), 1);
		assert_eq!(settings.targets.keywords, TargetSettings::default().keywords);
	}

	#[rstest]
	fn test_zero_page_size_rejected() {
		let result = GridSettings::from_toml_str("[pagination]\ndefault_page_size = 0\n");
		assert!(matches!(result, Err(CoreError::InvalidSetting { .. })));
	}

	#[rstest]
	fn test_page_size_above_max_rejected() {
		let text = "[pagination]\ndefault_page_size = 50\nmax_page_size = 20\n";
		let result = GridSettings::from_toml_str(text);
		assert!(matches!(result, Err(CoreError::InvalidSetting { .. })));
	}

	#[rstest]
	fn test_malformed_toml() {
		let result = GridSettings::from_toml_str("[pagination\n");
		assert!(matches!(result, Err(CoreError::SettingsParse(_))));
	}

	#[rstest]
	fn test_from_file() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[export]\nsubset_label = \"parcial\"").unwrap();

		// Act
		let settings = GridSettings::from_file(file.path()).unwrap();

		// Assert
		assert_eq!(settings.export.subset_label, "parcial");
	}

	#[rstest]
	#[case("Acciones", "acciones", true)]
	#[case("Color", "color", true)]
	#[case("Monto", "monto", false)]
	#[case("Creado por", "created_by", true)]
	fn test_denylist(#[case] header: &str, #[case] key: &str, #[case] denied: bool) {
		assert_eq!(ExportSettings::default().is_denied(header, key), denied);
	}

	#[rstest]
	fn test_keyword_rule_folds() {
		let rule = KeywordRule::new("Vehíc", "vehiculos");
		assert_eq!(rule.keyword, "vehic");
	}
}
