//! Record store boundary
//!
//! The dashboard's persistent store is an external collaborator. Bulk
//! delete goes through [`RecordStore`] as one batched call per action.
//! Stores that can only delete one row at a time are adapted with
//! [`SequentialDeleteStore`], which still reports a single outcome.

use crate::error::{FOREIGN_KEY_VIOLATION, StoreError};
use async_trait::async_trait;
use gridline_core::RecordId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

/// Store accepting batched deletes
#[async_trait]
pub trait RecordStore: Send + Sync {
	/// Delete every id in `ids` from `collection` in one request
	///
	/// Returns the number of rows removed.
	async fn bulk_delete(&self, collection: &str, ids: &[RecordId]) -> Result<u64, StoreError>;
}

/// Store that deletes one row per call
#[async_trait]
pub trait ItemStore: Send + Sync {
	/// Delete one row
	async fn delete_one(&self, collection: &str, id: &RecordId) -> Result<(), StoreError>;
}

/// Batches a per-item store behind [`RecordStore`]
///
/// Items are deleted in order. If any item fails the whole call fails with
/// one aggregated error naming every failed id; it is referential when any
/// item failure was.
#[derive(Debug, Clone)]
pub struct SequentialDeleteStore<S> {
	inner: S,
}

impl<S: ItemStore> SequentialDeleteStore<S> {
	/// Wrap a per-item store
	pub fn new(inner: S) -> Self {
		Self { inner }
	}

	/// Wrapped store
	pub fn inner(&self) -> &S {
		&self.inner
	}
}

#[async_trait]
impl<S: ItemStore> RecordStore for SequentialDeleteStore<S> {
	async fn bulk_delete(&self, collection: &str, ids: &[RecordId]) -> Result<u64, StoreError> {
		let mut deleted = 0u64;
		let mut failures: Vec<(RecordId, StoreError)> = Vec::new();
		for id in ids {
			match self.inner.delete_one(collection, id).await {
				Ok(()) => deleted += 1,
				Err(err) => failures.push((id.clone(), err)),
			}
		}

		if failures.is_empty() {
			return Ok(deleted);
		}

		tracing::warn!(
			collection,
			deleted,
			failed = failures.len(),
			"per-item delete finished with failures"
		);
		let referential = failures.iter().any(|(_, err)| err.is_referential());
		let detail = failures
			.iter()
			.map(|(id, err)| format!("{id}: {err}"))
			.collect::<Vec<_>>()
			.join("; ");
		let message = format!(
			"{} of {} deletions failed ({} deleted): {}",
			failures.len(),
			ids.len(),
			deleted,
			detail
		);
		let failed_ids = failures.into_iter().map(|(id, _)| id).collect();
		let error = if referential {
			StoreError::referential(message)
		} else {
			StoreError::other(message)
		};
		Err(error.with_failed_ids(failed_ids))
	}
}

/// A foreign-key style link between two rows
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Reference {
	from_collection: String,
	from_id: RecordId,
	to_collection: String,
	to_id: RecordId,
}

#[derive(Debug, Default)]
struct MemoryState {
	rows: BTreeMap<String, BTreeSet<RecordId>>,
	references: BTreeSet<Reference>,
	fail_next: Option<StoreError>,
	calls: usize,
}

/// In-memory store with declarable references
///
/// Batched deletes are atomic: if any id is still referenced from a row that
/// is not itself being deleted, nothing is removed and a referential error
/// with SQLSTATE `23503` is returned.
///
/// # Examples
///
/// ```
/// use gridline_admin::store::{MemoryStore, RecordStore};
/// use gridline_core::RecordId;
///
/// # tokio_test::block_on(async {
/// let store = MemoryStore::new()
///     .with_rows("clientes", [1, 2])
///     .with_rows("viajes", [10])
///     .with_reference(("viajes", 10), ("clientes", 2));
///
/// let err = store.bulk_delete("clientes", &[RecordId::from(1), RecordId::from(2)]).await.unwrap_err();
/// assert!(err.is_referential());
/// assert!(store.contains("clientes", &RecordId::from(1)));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
	state: Mutex<MemoryState>,
}

impl MemoryStore {
	/// Empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Add rows to a collection
	pub fn with_rows<I, T>(self, collection: &str, ids: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<RecordId>,
	{
		self.state
			.lock()
			.rows
			.entry(collection.to_string())
			.or_default()
			.extend(ids.into_iter().map(Into::into));
		self
	}

	/// Declare that row `from` references row `to`
	pub fn with_reference(
		self,
		from: (&str, impl Into<RecordId>),
		to: (&str, impl Into<RecordId>),
	) -> Self {
		self.state.lock().references.insert(Reference {
			from_collection: from.0.to_string(),
			from_id: from.1.into(),
			to_collection: to.0.to_string(),
			to_id: to.1.into(),
		});
		self
	}

	/// Make the next delete call fail with `error`
	pub fn fail_next(&self, error: StoreError) {
		self.state.lock().fail_next = Some(error);
	}

	/// Whether `collection` holds `id`
	pub fn contains(&self, collection: &str, id: &RecordId) -> bool {
		self.state
			.lock()
			.rows
			.get(collection)
			.is_some_and(|rows| rows.contains(id))
	}

	/// Number of rows in `collection`
	pub fn len(&self, collection: &str) -> usize {
		self.state.lock().rows.get(collection).map_or(0, BTreeSet::len)
	}

	/// Number of delete calls received, batched or per item
	pub fn calls(&self) -> usize {
		self.state.lock().calls
	}

	fn blocking_reference(
		state: &MemoryState,
		collection: &str,
		id: &RecordId,
		deleting: &BTreeSet<&RecordId>,
	) -> Option<Reference> {
		state
			.references
			.iter()
			.find(|r| {
				r.to_collection == collection
					&& &r.to_id == id
					&& state
						.rows
						.get(&r.from_collection)
						.is_some_and(|rows| rows.contains(&r.from_id))
					&& !(r.from_collection == collection && deleting.contains(&r.from_id))
			})
			.cloned()
	}

	fn delete_batch(&self, collection: &str, ids: &[RecordId]) -> Result<u64, StoreError> {
		let mut state = self.state.lock();
		state.calls += 1;
		if let Some(error) = state.fail_next.take() {
			return Err(error);
		}

		let deleting: BTreeSet<&RecordId> = ids.iter().collect();
		let blocked: Vec<(RecordId, Reference)> = ids
			.iter()
			.filter_map(|id| {
				Self::blocking_reference(&state, collection, id, &deleting).map(|r| (id.clone(), r))
			})
			.collect();
		if let Some((_, first)) = blocked.first() {
			let message = format!(
				"update or delete on table \"{}\" violates foreign key constraint on table \"{}\"",
				collection, first.from_collection
			);
			let failed = blocked.into_iter().map(|(id, _)| id).collect();
			return Err(StoreError::from_driver(message, Some(FOREIGN_KEY_VIOLATION))
				.with_failed_ids(failed));
		}

		let Some(rows) = state.rows.get_mut(collection) else {
			return Ok(0);
		};
		let removed = ids.iter().filter(|id| rows.remove(*id)).count() as u64;
		state.references.retain(|r| {
			!(r.from_collection == collection && ids.contains(&r.from_id))
		});
		Ok(removed)
	}
}

#[async_trait]
impl RecordStore for MemoryStore {
	async fn bulk_delete(&self, collection: &str, ids: &[RecordId]) -> Result<u64, StoreError> {
		self.delete_batch(collection, ids)
	}
}

#[async_trait]
impl ItemStore for MemoryStore {
	async fn delete_one(&self, collection: &str, id: &RecordId) -> Result<(), StoreError> {
		self.delete_batch(collection, std::slice::from_ref(id)).map(|_| ())
	}
}
