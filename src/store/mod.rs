//! Datastore abstraction
//!
//! The batch writer only talks to a [`Datastore`]: something that can mint
//! document IDs and apply a [`WriteUnit`] atomically. Implementations:
//! - [`FirestoreClient`](crate::client::FirestoreClient) for the Firestore REST API
//! - [`InMemoryStore`] for dry runs and tests

mod memory;

pub use memory::{CommitRecord, InMemoryStore};

use crate::batch::WriteUnit;
use async_trait::async_trait;
use eyre::Result;
use std::fmt;
use uuid::Uuid;

/// Length of generated document IDs, matching Firestore auto-IDs
pub const AUTO_ID_LEN: usize = 20;

const AUTO_ID_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Opaque document identifier assigned at write time
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh 20 character alphanumeric ID from a v4 UUID
    pub fn auto() -> Self {
        let mut entropy = Uuid::new_v4().as_u128();
        let id = (0..AUTO_ID_LEN)
            .map(|_| {
                let c = AUTO_ID_ALPHABET[(entropy % 62) as usize] as char;
                entropy /= 62;
                c
            })
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A document store that accepts atomic write units
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Mint a new, never reused document ID for `collection`
    fn new_document_id(&self, collection: &str) -> DocumentId {
        let _ = collection;
        DocumentId::auto()
    }

    /// Apply every staged write in `unit`, or none of them
    ///
    /// # Errors
    /// Returns an error if the commit was rejected. Nothing from the unit is
    /// visible in that case.
    async fn commit(&self, unit: &WriteUnit) -> Result<()>;

    /// List the IDs of every document currently in `collection`
    async fn list_document_ids(&self, collection: &str) -> Result<Vec<DocumentId>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_auto_id_shape() {
        let id = DocumentId::auto();
        assert_eq!(id.as_str().len(), AUTO_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_auto_ids_are_unique() {
        let ids: HashSet<_> = (0..10_000).map(|_| DocumentId::auto()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
