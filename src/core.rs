//! Records, values, columns and settings
//!
//! Everything the table and bulk-action layers share, re-exported from
//! `gridline-core`.
//!
//! ```rust
//! use gridline::core::{FieldMap, Record, Value};
//!
//! let row = FieldMap::new(7).with("destino", "Monterrey");
//! assert_eq!(row.field("destino"), Value::from("Monterrey"));
//! ```

pub use gridline_core::*;
