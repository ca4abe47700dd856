//! Error types for gridline-core

use thiserror::Error;

/// Errors raised while building records or loading settings
#[derive(Debug, Error)]
pub enum CoreError {
	/// The id field is absent from a source object
	#[error("Record has no '{0}' field")]
	MissingId(String),

	/// The id field holds something other than an integer or text
	#[error("Record field '{0}' is not a usable id")]
	InvalidId(String),

	/// Settings file could not be read
	#[error("Failed to read settings: {0}")]
	SettingsIo(#[from] std::io::Error),

	/// Settings file could not be parsed
	#[error("Failed to parse settings: {0}")]
	SettingsParse(#[from] toml::de::Error),

	/// Settings parsed but hold an unusable value
	#[error("Invalid setting '{field}': {reason}")]
	InvalidSetting {
		/// Dotted path of the offending setting
		field: String,
		/// Why it was rejected
		reason: String,
	},
}

/// Result type for gridline-core operations
pub type CoreResult<T> = Result<T, CoreError>;
