//! Shared building blocks for gridline
//!
//! This crate holds what every stage of the table engine agrees on:
//!
//! - **Records**: the [`Record`] trait, [`RecordId`], and the dynamic [`FieldMap`] row
//! - **Values**: the closed [`Value`] enum produced by every field read
//! - **Columns**: the [`Column`] trait, [`BaseColumn`], and [`CellRenderer`] strategies
//! - **Settings**: [`GridSettings`], loadable from TOML
//!
//! # Example
//!
//! ```rust
//! use gridline_core::{BaseColumn, Column, FieldMap, Record, Value};
//!
//! let row = FieldMap::new(1).with("monto", 100).with("fecha", "2024-01-05");
//! let monto = BaseColumn::new("monto", "Monto", |r: &FieldMap| r.field("monto"));
//!
//! assert_eq!(monto.value(&row), Value::Int(100));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod column;
pub mod error;
pub mod record;
pub mod settings;
pub mod text;
pub mod value;

// Re-exports for convenience
pub use column::{BaseColumn, BoxedColumn, CellRenderer, Column, field_column};
pub use error::{CoreError, CoreResult};
pub use record::{FieldMap, Record, RecordId};
pub use settings::{
	AccessorClass, ExportSettings, GridSettings, KeywordRule, PaginationSettings, TargetSettings,
};
pub use value::{Value, parse_calendar_day};
