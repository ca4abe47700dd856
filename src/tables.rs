//! Table views
//!
//! Sorting, filtering, pagination and selection, re-exported from
//! `gridline-tables`.

pub use gridline_tables::*;
