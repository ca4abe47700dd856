//! Pagination stage
//!
//! Pages are 1-based. Out-of-range requests are rejected and leave the
//! current state as it was; they are never clamped.

use crate::error::{Result, TableError};
use serde::{Deserialize, Serialize};

/// Number of pages needed for `count` items
///
/// Zero items give zero pages.
pub fn total_pages(count: usize, page_size: usize) -> usize {
	if page_size == 0 {
		return 0;
	}
	count.div_ceil(page_size)
}

/// Slice of `items` shown on page `page`
///
/// # Examples
///
/// ```
/// use gridline_tables::pagination::paginate;
///
/// let items: Vec<u32> = (1..=25).collect();
/// assert_eq!(paginate(&items, 3, 10).unwrap(), &[21, 22, 23, 24, 25]);
/// assert!(paginate(&items, 4, 10).is_err());
/// ```
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Result<&[T]> {
	if page_size == 0 {
		return Err(TableError::InvalidPageSize {
			size: page_size,
			max: usize::MAX,
		});
	}
	let pages = total_pages(items.len(), page_size);
	if page < 1 || page > pages {
		// An empty set still has an (empty) first page.
		if page == 1 && pages == 0 {
			return Ok(&items[..0]);
		}
		return Err(TableError::PageOutOfRange {
			requested: page,
			total_pages: pages,
		});
	}
	let start = (page - 1) * page_size;
	let end = (start + page_size).min(items.len());
	Ok(&items[start..end])
}

/// Current page position and size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
	page: usize,
	page_size: usize,
}

impl Default for PaginationConfig {
	fn default() -> Self {
		Self::new(10)
	}
}

impl PaginationConfig {
	/// First page with the given size
	pub fn new(page_size: usize) -> Self {
		Self {
			page: 1,
			page_size: page_size.max(1),
		}
	}

	/// Current page (1-based)
	pub fn page(&self) -> usize {
		self.page
	}

	/// Rows per page
	pub fn page_size(&self) -> usize {
		self.page_size
	}

	/// Move to `page` if it exists for `count` items
	pub fn go_to(&mut self, page: usize, count: usize) -> Result<()> {
		let pages = total_pages(count, self.page_size);
		if page < 1 || page > pages {
			return Err(TableError::PageOutOfRange {
				requested: page,
				total_pages: pages,
			});
		}
		self.page = page;
		Ok(())
	}

	/// Change the page size and return to page 1
	pub fn set_page_size(&mut self, page_size: usize, max: usize) -> Result<()> {
		if page_size == 0 || page_size > max {
			return Err(TableError::InvalidPageSize {
				size: page_size,
				max,
			});
		}
		self.page_size = page_size;
		self.page = 1;
		Ok(())
	}

	/// Back to page 1
	pub fn reset(&mut self) {
		self.page = 1;
	}

	/// Keep the page if it still exists for `count` items, else go to 1
	pub(crate) fn retain_or_reset(&mut self, count: usize) {
		if self.page > total_pages(count, self.page_size).max(1) {
			self.page = 1;
		}
	}

	/// Index range of the current page within `count` items
	pub fn window(&self, count: usize) -> std::ops::Range<usize> {
		let start = ((self.page - 1) * self.page_size).min(count);
		let end = (start + self.page_size).min(count);
		start..end
	}

	/// Summary for pager controls
	pub fn info(&self, count: usize) -> PageInfo {
		let pages = total_pages(count, self.page_size);
		PageInfo {
			page: self.page,
			page_size: self.page_size,
			total_pages: pages,
			total_items: count,
			has_next: self.page < pages,
			has_previous: self.page > 1,
		}
	}
}

/// Pager summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
	/// Current page (1-based)
	pub page: usize,
	/// Rows per page
	pub page_size: usize,
	/// Number of pages
	pub total_pages: usize,
	/// Number of filtered rows
	pub total_items: usize,
	/// A later page exists
	pub has_next: bool,
	/// An earlier page exists
	pub has_previous: bool,
}
