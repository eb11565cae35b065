// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Presentation controller mediating between the gateway and the views.
//!
//! Owns the authoritative plane collection. Gateway calls block, so each one
//! runs on its own worker thread driving the async client; the outcome comes
//! back through a channel and is applied on the UI thread in [`Presenter::poll`].
//! Mutations are serialized: one gateway operation in flight at a time.
//! The collection changes only after server confirmation; there are no
//! optimistic updates.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use chrono::Datelike;
use log::{info, warn};
use planes_api::{ApiError, DeleteReceipt, PlaneFields, PlaneRecord, PlaneStore, PlanesClient};

/// Earliest accepted year of manufacture.
const MIN_YEAR: i32 = 1851;

/// Outcome of a gateway operation, posted back from a worker thread.
enum OpOutcome {
    Loaded(Result<Vec<PlaneRecord>, ApiError>),
    Created(Result<PlaneRecord, ApiError>),
    Updated(Result<PlaneRecord, ApiError>),
    Deleted {
        id: i64,
        result: Result<DeleteReceipt, ApiError>,
    },
    Health {
        api_ok: bool,
        db_ok: bool,
    },
}

/// What the views should react to after the latest outcomes were applied.
#[derive(Debug, Clone)]
pub enum OpFeedback {
    /// The collection was replaced with a fresh server snapshot.
    Reloaded { count: usize },
    /// Reload failed; the previous collection is untouched.
    ReloadFailed { message: String },
    /// A create or update was confirmed; the form can close.
    Saved { id: Option<i64> },
    /// A create or update failed; the form stays open for correction.
    SaveFailed { message: String },
    /// The record is gone; any detail view for it must close.
    Deleted { id: i64 },
    /// Delete failed; the record stays displayed.
    DeleteFailed { message: String },
}

/// Presenter layer connecting the views to the gateway and the store.
pub struct Presenter {
    client: Arc<PlanesClient>,
    store: PlaneStore,
    outcome_tx: Sender<OpOutcome>,
    outcome_rx: Receiver<OpOutcome>,
    busy: bool,
    status: String,
    api_ok: Option<bool>,
    db_ok: Option<bool>,
}

impl std::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presenter")
            .field("planes", &self.store.len())
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl Presenter {
    pub fn new(client: PlanesClient) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            client: Arc::new(client),
            store: PlaneStore::new(),
            outcome_tx,
            outcome_rx,
            busy: false,
            status: "Connecting...".to_string(),
            api_ok: None,
            db_ok: None,
        }
    }

    /// The authoritative collection.
    pub fn store(&self) -> &PlaneStore {
        &self.store
    }

    /// Whether a gateway operation is in flight.
    pub fn busy(&self) -> bool {
        self.busy
    }

    /// One-line status for the bottom bar.
    pub fn status_line(&self) -> &str {
        &self.status
    }

    /// Latest health probe results: (API reachable, database reachable).
    pub fn health(&self) -> (Option<bool>, Option<bool>) {
        (self.api_ok, self.db_ok)
    }

    /// Fetch the full collection and replace the store on success.
    pub fn reload(&mut self, ctx: &egui::Context) {
        if !self.begin_op("reload") {
            return;
        }
        self.status = "Loading planes...".to_string();

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(client.list_all());
            let _ = tx.send(OpOutcome::Loaded(result));
            ctx.request_repaint();
        });
    }

    /// Create a plane after client-side validation.
    pub fn create(&mut self, ctx: &egui::Context, fields: PlaneFields) {
        if let Err(message) = validate_fields(&fields) {
            let _ = self
                .outcome_tx
                .send(OpOutcome::Created(Err(ApiError::Validation { message })));
            ctx.request_repaint();
            return;
        }
        if !self.begin_op("create") {
            return;
        }
        self.status = format!("Saving {}...", fields.name);

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(client.create(&fields));
            let _ = tx.send(OpOutcome::Created(result));
            ctx.request_repaint();
        });
    }

    /// Replace all fields of an existing plane after client-side validation.
    pub fn update(&mut self, ctx: &egui::Context, id: i64, fields: PlaneFields) {
        if let Err(message) = validate_fields(&fields) {
            let _ = self
                .outcome_tx
                .send(OpOutcome::Updated(Err(ApiError::Validation { message })));
            ctx.request_repaint();
            return;
        }
        if !self.begin_op("update") {
            return;
        }
        self.status = format!("Updating {}...", fields.name);

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(client.update(id, &fields));
            let _ = tx.send(OpOutcome::Updated(result));
            ctx.request_repaint();
        });
    }

    /// Delete a plane by id.
    pub fn delete(&mut self, ctx: &egui::Context, id: i64) {
        if !self.begin_op("delete") {
            return;
        }
        self.status = "Deleting plane...".to_string();

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(client.delete(id));
            let _ = tx.send(OpOutcome::Deleted { id, result });
            ctx.request_repaint();
        });
    }

    /// Probe API and database health for the status bar. Runs outside the
    /// one-op-at-a-time discipline; it never touches the collection.
    pub fn probe_health(&self, ctx: &egui::Context) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let api_ok = rt.block_on(client.health()).unwrap_or(false);
            let db_ok = rt.block_on(client.db_ping()).unwrap_or(false);
            let _ = tx.send(OpOutcome::Health { api_ok, db_ok });
            ctx.request_repaint();
        });
    }

    /// Drain completed operations and apply them to the store.
    ///
    /// Called once per frame from the UI thread, the single place the
    /// authoritative collection mutates.
    pub fn poll(&mut self, ctx: &egui::Context) -> Vec<OpFeedback> {
        let mut feedback = Vec::new();

        while let Ok(outcome) = self.outcome_rx.try_recv() {
            match outcome {
                OpOutcome::Loaded(Ok(planes)) => {
                    self.busy = false;
                    let count = planes.len();
                    self.store.replace_all(planes);
                    self.status = format!("Loaded {count} planes");
                    info!("loaded {count} planes");
                    feedback.push(OpFeedback::Reloaded { count });
                }
                OpOutcome::Loaded(Err(e)) => {
                    self.busy = false;
                    self.status = "Load failed".to_string();
                    feedback.push(OpFeedback::ReloadFailed {
                        message: format!("Failed to load planes: {e}"),
                    });
                }
                OpOutcome::Created(Ok(plane)) => {
                    self.busy = false;
                    self.status = format!("Added {}", plane.name);
                    let id = plane.id;
                    self.store.insert(plane);
                    feedback.push(OpFeedback::Saved { id });
                }
                OpOutcome::Created(Err(e)) => {
                    self.busy = false;
                    self.status = "Add failed".to_string();
                    feedback.push(OpFeedback::SaveFailed {
                        message: format!("Error adding plane: {e}"),
                    });
                }
                OpOutcome::Updated(Ok(plane)) => {
                    self.busy = false;
                    self.status = format!("Updated {}", plane.name);
                    let id = plane.id;
                    if !self.store.update(plane) {
                        // Confirmed server-side but unknown locally; resync.
                        warn!("updated plane missing from local collection, reloading");
                        self.reload(ctx);
                    }
                    feedback.push(OpFeedback::Saved { id });
                }
                OpOutcome::Updated(Err(e)) => {
                    self.busy = false;
                    self.status = "Update failed".to_string();
                    let resync = e.is_not_found();
                    feedback.push(OpFeedback::SaveFailed {
                        message: format!("Error updating plane: {e}"),
                    });
                    if resync {
                        self.reload(ctx);
                    }
                }
                OpOutcome::Deleted { id, result: Ok(receipt) } => {
                    self.busy = false;
                    self.store.remove(id);
                    self.status = receipt.detail;
                    feedback.push(OpFeedback::Deleted { id });
                }
                OpOutcome::Deleted { id, result: Err(e) } => {
                    self.busy = false;
                    self.status = "Delete failed".to_string();
                    let resync = e.is_not_found();
                    feedback.push(OpFeedback::DeleteFailed {
                        message: format!("Error deleting plane {id}: {e}"),
                    });
                    if resync {
                        self.reload(ctx);
                    }
                }
                OpOutcome::Health { api_ok, db_ok } => {
                    self.api_ok = Some(api_ok);
                    self.db_ok = Some(db_ok);
                }
            }
        }

        feedback
    }

    fn begin_op(&mut self, name: &str) -> bool {
        if self.busy {
            warn!("gateway operation already in flight, ignoring {name}");
            return false;
        }
        self.busy = true;
        true
    }
}

/// Client-side field validation applied before create/update.
///
/// One consistent rule set: non-empty name and manufacturer, a plausible
/// manufacturing year, and at least one seat class with capacity.
pub fn validate_fields(fields: &PlaneFields) -> Result<(), String> {
    if fields.name.trim().is_empty() {
        return Err("Name must not be empty".to_string());
    }
    if fields.manufacturer.trim().is_empty() {
        return Err("Manufacturer must not be empty".to_string());
    }
    let max_year = chrono::Utc::now().year() + 1;
    if fields.year < MIN_YEAR || fields.year > max_year {
        return Err(format!("Year must be between {MIN_YEAR} and {max_year}"));
    }
    if fields.seats_class_a == 0 && fields.seats_class_b == 0 && fields.seats_class_c == 0 {
        return Err("At least one seat class must have capacity".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_fields() -> PlaneFields {
        PlaneFields {
            name: "737".to_string(),
            year: 2005,
            manufacturer: "Boeing".to_string(),
            image_ref: None,
            seats_class_a: 8,
            seats_class_b: 20,
            seats_class_c: 150,
        }
    }

    #[test]
    fn test_valid_fields_pass() {
        assert!(validate_fields(&valid_fields()).is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let fields = PlaneFields {
            name: "   ".to_string(),
            ..valid_fields()
        };
        assert!(validate_fields(&fields).is_err());
    }

    #[test]
    fn test_year_bounds() {
        let mut fields = valid_fields();
        fields.year = 1850;
        assert!(validate_fields(&fields).is_err());
        fields.year = 1851;
        assert!(validate_fields(&fields).is_ok());
        fields.year = chrono::Utc::now().year() + 1;
        assert!(validate_fields(&fields).is_ok());
        fields.year = chrono::Utc::now().year() + 2;
        assert!(validate_fields(&fields).is_err());
    }

    #[test]
    fn test_all_zero_seats_rejected() {
        let fields = PlaneFields {
            seats_class_a: 0,
            seats_class_b: 0,
            seats_class_c: 0,
            ..valid_fields()
        };
        assert!(validate_fields(&fields).is_err());
    }
}
