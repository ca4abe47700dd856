//! Bulk action dispatcher
//!
//! Runs export and delete actions against the current selection. Each
//! invocation walks one state machine:
//!
//! ```text
//! Idle ──► Confirming ──► Executing ──► Succeeded | Failed ──► Idle
//!   └──────────────────────┘ (export skips confirmation)
//! ```
//!
//! Deletes always stop in `Confirming` and only run when the caller hands
//! back the [`DeleteConfirmation`]. `Executing` is not re-entrant: any new
//! dispatch or confirmation while an action runs fails with
//! [`ActionError::Busy`].
//!
//! A failed delete leaves the selection exactly as it was. A successful one
//! removes the deleted ids from the selection and raises `on_data_changed` so
//! the page can refetch its records.

use crate::error::{ActionError, ActionResult};
use crate::export::{ExportArtifact, SpreadsheetExporter};
use crate::resolver::{ResolutionPath, TargetResolver};
use crate::sink::ArtifactSink;
use crate::store::RecordStore;
use gridline_core::{BoxedColumn, GridSettings, Record, RecordId};
use gridline_tables::SelectionSet;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Actions the dispatcher runs against a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkAction {
	/// Export the selected rows of the filtered set
	ExportSubset,
	/// Delete every selected id from the page's collection
	DeleteSubset,
}

/// Dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchPhase {
	/// Nothing pending
	Idle,
	/// A delete waits for confirmation
	Confirming,
	/// An action is running
	Executing,
	/// The last action succeeded
	Succeeded,
	/// The last action failed
	Failed,
}

impl DispatchPhase {
	/// Whether a new action may start
	pub fn is_settled(self) -> bool {
		matches!(
			self,
			DispatchPhase::Idle | DispatchPhase::Succeeded | DispatchPhase::Failed
		)
	}
}

/// A delete waiting for the user's go-ahead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
	token: u64,
	/// Page title the target was resolved from
	pub title: String,
	/// Target collection
	pub collection: String,
	/// How the collection was resolved
	pub path: ResolutionPath,
	/// Ids to delete
	pub ids: Vec<RecordId>,
	/// Text for the confirmation dialog
	pub prompt: String,
}

/// Result of [`BulkActionDispatcher::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
	/// Export finished and was delivered
	Exported(ExportArtifact),
	/// Delete needs confirmation
	ConfirmDelete(DeleteConfirmation),
}

/// Result of a confirmed delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
	/// Target collection
	pub collection: String,
	/// Ids requested
	pub ids: Vec<RecordId>,
	/// Rows the store reported removed
	pub deleted: u64,
}

#[derive(Debug)]
struct DispatchState {
	phase: DispatchPhase,
	pending: Option<u64>,
	next_token: u64,
}

/// Sets the phase to `Failed` if an action is dropped before it settles
struct ExecutionGuard<'a> {
	state: &'a Mutex<DispatchState>,
	settled: bool,
}

impl ExecutionGuard<'_> {
	fn settle(mut self, phase: DispatchPhase) {
		self.state.lock().phase = phase;
		self.settled = true;
	}
}

impl Drop for ExecutionGuard<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.state.lock().phase = DispatchPhase::Failed;
		}
	}
}

/// Hook raised after a successful delete
pub type DataChangedHandler = Box<dyn Fn() + Send + Sync>;

/// Dispatches bulk export and delete actions
pub struct BulkActionDispatcher {
	store: Arc<dyn RecordStore>,
	sink: Arc<dyn ArtifactSink>,
	exporter: SpreadsheetExporter,
	resolver: TargetResolver,
	state: Mutex<DispatchState>,
	on_data_changed: Option<DataChangedHandler>,
}

impl BulkActionDispatcher {
	/// Dispatcher with default settings
	pub fn new(store: Arc<dyn RecordStore>, sink: Arc<dyn ArtifactSink>) -> Self {
		Self::with_settings(store, sink, &GridSettings::default())
	}

	/// Dispatcher configured from settings
	pub fn with_settings(
		store: Arc<dyn RecordStore>,
		sink: Arc<dyn ArtifactSink>,
		settings: &GridSettings,
	) -> Self {
		Self {
			store,
			sink,
			exporter: SpreadsheetExporter::new(settings.export.clone()),
			resolver: TargetResolver::from_settings(&settings.targets),
			state: Mutex::new(DispatchState {
				phase: DispatchPhase::Idle,
				pending: None,
				next_token: 1,
			}),
			on_data_changed: None,
		}
	}

	/// Replace the target resolver
	pub fn with_resolver(mut self, resolver: TargetResolver) -> Self {
		self.resolver = resolver;
		self
	}

	/// Replace the exporter
	pub fn with_exporter(mut self, exporter: SpreadsheetExporter) -> Self {
		self.exporter = exporter;
		self
	}

	/// Register the hook raised after a successful delete
	pub fn on_data_changed(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
		self.on_data_changed = Some(Box::new(handler));
		self
	}

	/// Current phase
	pub fn phase(&self) -> DispatchPhase {
		self.state.lock().phase
	}

	/// Exporter in use
	pub fn exporter(&self) -> &SpreadsheetExporter {
		&self.exporter
	}

	/// Start `action` for the selected rows
	///
	/// `records` is the full filtered set; exports keep the selected rows of
	/// it. Deletes act on every selected id, including ids filtered out of
	/// view, and return a confirmation instead of running.
	///
	/// Starting any action discards a delete still awaiting confirmation; the
	/// discarded confirmation then fails with [`ActionError::NotConfirming`].
	pub async fn dispatch<'a, R, I>(
		&self,
		action: BulkAction,
		selection: &SelectionSet,
		records: I,
		columns: &[BoxedColumn<R>],
		title: &str,
	) -> ActionResult<DispatchOutcome>
	where
		R: Record + 'a,
		I: IntoIterator<Item = &'a R>,
	{
		if selection.is_empty() {
			return Err(ActionError::EmptySelection);
		}
		match action {
			BulkAction::ExportSubset => {
				let selected: Vec<&R> = records
					.into_iter()
					.filter(|r| selection.contains(&r.id()))
					.collect();
				if selected.is_empty() {
					return Err(ActionError::EmptySelection);
				}
				let label = self.exporter.settings().subset_label.clone();
				self.run_export(selected, columns, title, Some(&label))
					.await
					.map(DispatchOutcome::Exported)
			}
			BulkAction::DeleteSubset => self
				.request_delete(title, selection.to_vec())
				.map(DispatchOutcome::ConfirmDelete),
		}
	}

	/// Export every row of `records` under the full-export file name
	pub async fn export_all<'a, R, I>(
		&self,
		records: I,
		columns: &[BoxedColumn<R>],
		title: &str,
	) -> ActionResult<ExportArtifact>
	where
		R: 'a,
		I: IntoIterator<Item = &'a R>,
	{
		let rows: Vec<&R> = records.into_iter().collect();
		self.run_export(rows, columns, title, None).await
	}

	async fn run_export<R>(
		&self,
		rows: Vec<&R>,
		columns: &[BoxedColumn<R>],
		title: &str,
		subset_label: Option<&str>,
	) -> ActionResult<ExportArtifact> {
		let guard = self.begin()?;
		let built = self.exporter.export(rows, columns, title, subset_label);
		let artifact = match built {
			Ok(artifact) => artifact,
			Err(err) => {
				tracing::error!(title, error = %err, "export failed");
				guard.settle(DispatchPhase::Failed);
				return Err(err.into());
			}
		};
		if let Err(err) = self.sink.deliver(&artifact).await {
			tracing::error!(filename = %artifact.filename, error = %err, "export delivery failed");
			guard.settle(DispatchPhase::Failed);
			return Err(err.into());
		}
		guard.settle(DispatchPhase::Succeeded);
		Ok(artifact)
	}

	fn request_delete(&self, title: &str, ids: Vec<RecordId>) -> ActionResult<DeleteConfirmation> {
		let resolution = self
			.resolver
			.resolve(title)
			.ok_or_else(|| ActionError::UnresolvedTarget(title.to_string()))?;

		let mut state = self.state.lock();
		if state.phase == DispatchPhase::Executing {
			return Err(ActionError::Busy);
		}
		let token = state.next_token;
		state.next_token += 1;
		if let Some(previous) = state.pending.replace(token) {
			tracing::debug!(token = previous, "pending delete confirmation replaced");
		}
		state.phase = DispatchPhase::Confirming;
		drop(state);

		tracing::debug!(
			title,
			collection = %resolution.collection,
			path = %resolution.path,
			count = ids.len(),
			"delete awaiting confirmation"
		);
		let prompt = format!(
			"Delete {} selected record(s) from \"{}\"? This action cannot be undone.",
			ids.len(),
			title.trim()
		);
		Ok(DeleteConfirmation {
			token,
			title: title.to_string(),
			collection: resolution.collection,
			path: resolution.path,
			ids,
			prompt,
		})
	}

	/// Run a confirmed delete as one batched store call
	///
	/// On success the deleted ids leave `selection` and `on_data_changed` is
	/// raised. On failure nothing local changes.
	pub async fn confirm_delete(
		&self,
		confirmation: &DeleteConfirmation,
		selection: &mut SelectionSet,
	) -> ActionResult<DeleteReport> {
		let guard = {
			let mut state = self.state.lock();
			match state.phase {
				DispatchPhase::Executing => return Err(ActionError::Busy),
				DispatchPhase::Confirming if state.pending == Some(confirmation.token) => {
					state.pending = None;
					state.phase = DispatchPhase::Executing;
				}
				_ => return Err(ActionError::NotConfirming),
			}
			ExecutionGuard {
				state: &self.state,
				settled: false,
			}
		};

		let collection = confirmation.collection.as_str();
		match self.store.bulk_delete(collection, &confirmation.ids).await {
			Ok(deleted) => {
				selection.remove_all(&confirmation.ids);
				guard.settle(DispatchPhase::Succeeded);
				tracing::info!(collection, deleted, requested = confirmation.ids.len(), "bulk delete succeeded");
				if let Some(handler) = &self.on_data_changed {
					handler();
				}
				Ok(DeleteReport {
					collection: collection.to_string(),
					ids: confirmation.ids.clone(),
					deleted,
				})
			}
			Err(err) => {
				guard.settle(DispatchPhase::Failed);
				tracing::error!(
					collection,
					referential = err.is_referential(),
					error = %err,
					"bulk delete failed"
				);
				Err(ActionError::from_store(collection, err))
			}
		}
	}

	/// Abandon a pending delete; returns whether it was pending
	pub fn cancel(&self, confirmation: &DeleteConfirmation) -> bool {
		let mut state = self.state.lock();
		if state.phase == DispatchPhase::Confirming && state.pending == Some(confirmation.token) {
			state.pending = None;
			state.phase = DispatchPhase::Idle;
			tracing::debug!(collection = %confirmation.collection, "delete cancelled");
			true
		} else {
			false
		}
	}

	fn begin(&self) -> ActionResult<ExecutionGuard<'_>> {
		let mut state = self.state.lock();
		if state.phase == DispatchPhase::Executing {
			return Err(ActionError::Busy);
		}
		if let Some(token) = state.pending.take() {
			tracing::debug!(token, "pending delete confirmation discarded by a new action");
		}
		state.phase = DispatchPhase::Executing;
		Ok(ExecutionGuard {
			state: &self.state,
			settled: false,
		})
	}
}

impl fmt::Debug for BulkActionDispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BulkActionDispatcher")
			.field("exporter", &self.exporter)
			.field("resolver", &self.resolver)
			.field("state", &*self.state.lock())
			.field("on_data_changed", &self.on_data_changed.is_some())
			.finish_non_exhaustive()
	}
}
