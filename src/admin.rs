//! Bulk actions
//!
//! Spreadsheet export, delete-target resolution and the confirmed bulk delete
//! flow, re-exported from `gridline-admin`.
//!
//! ## Architecture
//!
//! - **export**: XLSX workbook building
//! - **sink**: delivery of finished files
//! - **store**: batched delete boundary
//! - **resolver**: page title to collection
//! - **dispatcher**: the action state machine

pub use gridline_admin::*;
