//! Process-local datastore
//!
//! Used for `--dry-run` and as the test double for the batch writer. Each
//! commit is applied under a single lock, so a unit is either fully visible
//! or not at all, and failures can be injected per commit or per collection.

use super::{Datastore, DocumentId};
use crate::batch::{StagedWrite, WriteUnit};
use crate::seed::Record;
use async_trait::async_trait;
use eyre::{Result, eyre};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One attempted commit, as seen by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub collection: String,
    pub size: usize,
    pub succeeded: bool,
}

#[derive(Debug, Default)]
struct State {
    // collection -> (insertion sequence -> (id, record))
    collections: HashMap<String, BTreeMap<u64, (DocumentId, Record)>>,
    next_seq: u64,
    commits: Vec<CommitRecord>,
    fail_attempts: HashSet<usize>,
    fail_collections: HashSet<String>,
}

/// In-memory [`Datastore`]
///
/// Cloning shares the underlying state, so a test can hand one clone to the
/// writer and inspect another afterwards.
///
/// # Example
/// ```
/// use seedr::store::InMemoryStore;
///
/// let store = InMemoryStore::new().fail_collection("categories");
/// assert_eq!(store.count("categories"), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the commit attempt with zero-based index `attempt`
    pub fn fail_commit(self, attempt: usize) -> Self {
        self.state().fail_attempts.insert(attempt);
        self
    }

    /// Reject every commit to `collection`
    pub fn fail_collection(self, collection: impl Into<String>) -> Self {
        self.state().fail_collections.insert(collection.into());
        self
    }

    /// Insert a document directly, bypassing commit bookkeeping
    pub fn insert(&self, collection: &str, id: DocumentId, record: Record) {
        let mut state = self.state();
        let seq = state.next_seq;
        state.next_seq += 1;
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(seq, (id, record));
    }

    /// Documents in `collection`, in the order they were written
    pub fn documents(&self, collection: &str) -> Vec<(DocumentId, Record)> {
        self.state()
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.state()
            .collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Every commit attempt so far, including rejected ones
    pub fn commits(&self) -> Vec<CommitRecord> {
        self.state().commits.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Datastore for InMemoryStore {
    async fn commit(&self, unit: &WriteUnit) -> Result<()> {
        let mut state = self.state();
        let attempt = state.commits.len();
        let rejected = state.fail_attempts.contains(&attempt)
            || state.fail_collections.contains(unit.collection());

        state.commits.push(CommitRecord {
            collection: unit.collection().to_string(),
            size: unit.len(),
            succeeded: !rejected,
        });

        if rejected {
            return Err(eyre!(
                "commit {} to '{}' rejected by in-memory store",
                attempt,
                unit.collection()
            ));
        }

        let mut seq = state.next_seq;
        let docs = state
            .collections
            .entry(unit.collection().to_string())
            .or_default();
        for write in unit.writes() {
            match write {
                StagedWrite::Set { id, record } => {
                    docs.retain(|_, (existing, _)| existing != id);
                    docs.insert(seq, (id.clone(), record.clone()));
                    seq += 1;
                }
                StagedWrite::Delete { id } => {
                    docs.retain(|_, (existing, _)| existing != id);
                }
            }
        }
        state.next_seq = seq;

        Ok(())
    }

    async fn list_document_ids(&self, collection: &str) -> Result<Vec<DocumentId>> {
        Ok(self
            .documents(collection)
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }
}
