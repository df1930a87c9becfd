use crate::seed::Record;
use crate::store::DocumentId;

/// A single staged operation inside a [`WriteUnit`]
#[derive(Debug, Clone, PartialEq)]
pub enum StagedWrite {
    /// Create the document, or overwrite it if the ID already exists
    Set { id: DocumentId, record: Record },
    /// Remove the document
    Delete { id: DocumentId },
}

impl StagedWrite {
    pub fn id(&self) -> &DocumentId {
        match self {
            Self::Set { id, .. } | Self::Delete { id } => id,
        }
    }
}

/// A group of writes to one collection that is committed atomically
///
/// The batch writer never builds a unit larger than its configured limit, and
/// never commits an empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteUnit {
    collection: String,
    writes: Vec<StagedWrite>,
}

impl WriteUnit {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            writes: Vec::new(),
        }
    }

    /// Stage a create/overwrite of `record` under `id`
    pub fn stage(&mut self, id: DocumentId, record: Record) {
        self.writes.push(StagedWrite::Set { id, record });
    }

    /// Stage a delete of the document `id`
    pub fn stage_delete(&mut self, id: DocumentId) {
        self.writes.push(StagedWrite::Delete { id });
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn writes(&self) -> &[StagedWrite] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
