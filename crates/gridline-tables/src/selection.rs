//! Selection tracker
//!
//! The selection is a set of record ids. It is independent of sorting,
//! filtering and pagination: an id stays selected while its record is
//! filtered out of view, and only explicit mutators remove it.

use gridline_core::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Persistent set of selected record ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
	ids: BTreeSet<RecordId>,
}

impl SelectionSet {
	/// Empty selection
	pub fn new() -> Self {
		Self::default()
	}

	/// Flip membership of `id`; returns whether it is now selected
	pub fn toggle(&mut self, id: impl Into<RecordId>) -> bool {
		let id = id.into();
		if self.ids.remove(&id) {
			false
		} else {
			self.ids.insert(id);
			true
		}
	}

	/// Select `id`
	pub fn insert(&mut self, id: impl Into<RecordId>) -> bool {
		self.ids.insert(id.into())
	}

	/// Deselect `id`
	pub fn remove(&mut self, id: &RecordId) -> bool {
		self.ids.remove(id)
	}

	/// Deselect every id in `ids`
	pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RecordId>) {
		for id in ids {
			self.ids.remove(id);
		}
	}

	/// Deselect everything
	pub fn clear(&mut self) {
		self.ids.clear();
	}

	/// Whether `id` is selected
	pub fn contains(&self, id: &RecordId) -> bool {
		self.ids.contains(id)
	}

	/// Number of selected ids
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Whether nothing is selected
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Selected ids in ascending order
	pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
		self.ids.iter()
	}

	/// Selected ids collected into a vector
	pub fn to_vec(&self) -> Vec<RecordId> {
		self.ids.iter().cloned().collect()
	}

	/// True iff `window` is non-empty and every record in it is selected
	///
	/// Only the given window is considered, never the full filtered set.
	pub fn all_selected<R: Record>(&self, window: &[R]) -> bool {
		!window.is_empty() && window.iter().all(|r| self.ids.contains(&r.id()))
	}

	/// Select-all toggle scoped to `window`
	///
	/// When the window is fully selected its ids are removed; otherwise they
	/// are all added. Ids outside the window are never touched.
	///
	/// # Examples
	///
	/// ```
	/// use gridline_core::{FieldMap, RecordId};
	/// use gridline_tables::selection::SelectionSet;
	///
	/// let page = vec![FieldMap::new(1), FieldMap::new(2)];
	/// let mut selection = SelectionSet::new();
	/// selection.insert(99);
	///
	/// selection.toggle_all(&page);
	/// assert_eq!(selection.len(), 3);
	///
	/// selection.toggle_all(&page);
	/// assert_eq!(selection.to_vec(), vec![RecordId::from(99)]);
	/// ```
	pub fn toggle_all<R: Record>(&mut self, window: &[R]) {
		if self.all_selected(window) {
			for record in window {
				self.ids.remove(&record.id());
			}
		} else {
			self.ids.extend(window.iter().map(Record::id));
		}
	}
}

impl FromIterator<RecordId> for SelectionSet {
	fn from_iter<I: IntoIterator<Item = RecordId>>(iter: I) -> Self {
		Self {
			ids: iter.into_iter().collect(),
		}
	}
}

impl Extend<RecordId> for SelectionSet {
	fn extend<I: IntoIterator<Item = RecordId>>(&mut self, iter: I) {
		self.ids.extend(iter);
	}
}
