//! Service wiring for the portal surface.
//!
//! The read stores are deliberately in-memory: the routes exist to exercise
//! authentication and row-filter pushdown end to end, not to be a
//! persistence layer. A real deployment swaps them for the database-backed
//! collaborators, which receive the same [`RowFilter`] as a query
//! constraint.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crewdesk_auth::{OwnedRecord, Ownership, PolicyEvaluator, RowFilter};
use crewdesk_core::{ActorId, RecordId};

/// A project board. Globally shared among privileged roles; no owner.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub id: RecordId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl OwnedRecord for Board {
    fn owners(&self) -> Ownership {
        Ownership::Unowned
    }
}

/// An invoice, owned by the billed client.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: RecordId,
    pub number: String,
    pub billed_to: ActorId,
    pub amount_cents: i64,
    pub issued_at: DateTime<Utc>,
}

impl OwnedRecord for Invoice {
    fn owners(&self) -> Ownership {
        Ownership::one(self.billed_to)
    }
}

/// A direct message; sender and receiver are both eligible owners.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: RecordId,
    pub sender: ActorId,
    pub receiver: ActorId,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl OwnedRecord for Message {
    fn owners(&self) -> Ownership {
        Ownership::many([self.sender, self.receiver])
    }
}

/// Read store applying the row filter as a query constraint.
///
/// The filter is applied *inside* the store; the caller never sees rows it
/// may not list.
pub struct RecordStore<T> {
    rows: Mutex<Vec<T>>,
}

impl<T: OwnedRecord + Clone> RecordStore<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, row: T) {
        self.rows.lock().unwrap().push(row);
    }

    pub fn list(&self, filter: RowFilter) -> Vec<T> {
        let rows = self.rows.lock().unwrap();
        match filter {
            RowFilter::Unrestricted => rows.clone(),
            RowFilter::OwnedBy(actor) => rows
                .iter()
                .filter(|row| row.owners().includes(actor))
                .cloned()
                .collect(),
            RowFilter::DenyAll => Vec::new(),
        }
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        let rows = self.rows.lock().unwrap();
        rows.iter().find(|&row| pred(row)).cloned()
    }
}

impl<T: OwnedRecord + Clone> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the routes need.
pub struct AppServices {
    pub evaluator: PolicyEvaluator,
    pub boards: RecordStore<Board>,
    pub invoices: RecordStore<Invoice>,
    pub messages: RecordStore<Message>,
}

impl AppServices {
    pub fn new(evaluator: PolicyEvaluator) -> Self {
        Self {
            evaluator,
            boards: RecordStore::new(),
            invoices: RecordStore::new(),
            messages: RecordStore::new(),
        }
    }
}
