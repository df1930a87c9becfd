//! Batched bulk writer
//!
//! Splits a collection's records into write units of at most `limit`
//! records and commits them one after another. The first rejected unit ends
//! the write for that collection; units committed before it stay committed.

use super::WriteUnit;
use crate::seed::Record;
use crate::store::{Datastore, DocumentId};
use eyre::{Report, Result};
use owo_colors::OwoColorize;

/// Maximum number of writes Firestore accepts in a single commit
pub const MAX_WRITES_PER_COMMIT: usize = 500;

/// Result of writing one collection
#[derive(Debug)]
pub struct WriteOutcome {
    collection: String,
    written: usize,
    error: Option<Report>,
}

impl WriteOutcome {
    pub fn succeeded(collection: impl Into<String>, written: usize) -> Self {
        Self {
            collection: collection.into(),
            written,
            error: None,
        }
    }

    pub fn failed(collection: impl Into<String>, written: usize, error: Report) -> Self {
        Self {
            collection: collection.into(),
            written,
            error: Some(error),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of records persisted before any failure
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn error(&self) -> Option<&Report> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Writes records for one collection at a time in atomic units
///
/// # Example
/// ```
/// use seedr::batch::BatchWriter;
/// use seedr::seed::Record;
/// use seedr::store::InMemoryStore;
///
/// # async fn example() -> eyre::Result<()> {
/// let store = InMemoryStore::new();
/// let writer = BatchWriter::new(&store).with_limit(2)?;
///
/// let records = vec![Record::new().with("name", "More"); 5];
/// let outcome = writer.write_all("categories", &records).await;
///
/// assert!(outcome.is_success());
/// assert_eq!(outcome.written(), 5);
/// assert_eq!(store.commits().len(), 3);
/// # Ok(())
/// # }
/// ```
pub struct BatchWriter<'a, D: ?Sized> {
    store: &'a D,
    limit: usize,
}

impl<'a, D: Datastore + ?Sized> BatchWriter<'a, D> {
    /// Create a writer using the Firestore commit limit
    pub fn new(store: &'a D) -> Self {
        Self {
            store,
            limit: MAX_WRITES_PER_COMMIT,
        }
    }

    /// Set the number of writes per atomic unit
    ///
    /// # Errors
    /// Returns an error if `limit` is zero or exceeds [`MAX_WRITES_PER_COMMIT`].
    pub fn with_limit(mut self, limit: usize) -> Result<Self> {
        if limit == 0 || limit > MAX_WRITES_PER_COMMIT {
            eyre::bail!(
                "Batch size must be between 1 and {}, got {}",
                MAX_WRITES_PER_COMMIT,
                limit
            );
        }
        self.limit = limit;
        Ok(self)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Persist every record in `records` as a new document in `collection`
    ///
    /// Each record gets a freshly minted document ID. Units are committed in
    /// input order and the first failure stops the collection. The returned
    /// outcome carries the number of records committed before that failure.
    pub async fn write_all(&self, collection: &str, records: &[Record]) -> WriteOutcome {
        if records.is_empty() {
            log::warn!("No records for '{}', nothing to write", collection.cyan());
            return WriteOutcome::succeeded(collection, 0);
        }

        let total_units = records.len().div_ceil(self.limit);
        let mut written = 0;

        for (index, chunk) in records.chunks(self.limit).enumerate() {
            let mut unit = WriteUnit::new(collection);
            for record in chunk {
                unit.stage(self.store.new_document_id(collection), record.clone());
            }

            log::debug!(
                "Committing unit {}/{} to '{}' ({} writes)",
                index + 1,
                total_units,
                collection.cyan(),
                unit.len()
            );

            if let Err(e) = self.store.commit(&unit).await {
                log::debug!(
                    "Unit {}/{} to '{}' rejected after {} records written",
                    index + 1,
                    total_units,
                    collection.cyan(),
                    written
                );
                let error = e.wrap_err(format!(
                    "write unit {}/{} ({} records) was not committed",
                    index + 1,
                    total_units,
                    unit.len()
                ));
                return WriteOutcome::failed(collection, written, error);
            }

            written += unit.len();
        }

        log::debug!(
            "Wrote {} records to '{}' in {} units",
            written.green(),
            collection.cyan(),
            total_units
        );

        WriteOutcome::succeeded(collection, written)
    }

    /// Delete every existing document in `collection`
    ///
    /// Deletes are grouped into atomic units of the same size limit as writes.
    /// Returns the number of documents deleted.
    ///
    /// # Errors
    /// Returns an error if listing fails or a delete unit is rejected. Units
    /// committed before the failure stay committed.
    pub async fn clear(&self, collection: &str) -> Result<usize> {
        let ids: Vec<DocumentId> = self.store.list_document_ids(collection).await?;
        if ids.is_empty() {
            log::debug!("'{}' is already empty", collection.cyan());
            return Ok(0);
        }

        let total_units = ids.len().div_ceil(self.limit);
        let mut deleted = 0;

        for (index, chunk) in ids.chunks(self.limit).enumerate() {
            let mut unit = WriteUnit::new(collection);
            for id in chunk {
                unit.stage_delete(id.clone());
            }

            log::debug!(
                "Committing delete unit {}/{} to '{}' ({} deletes)",
                index + 1,
                total_units,
                collection.cyan(),
                unit.len()
            );

            self.store.commit(&unit).await.map_err(|e| {
                e.wrap_err(format!(
                    "delete unit {}/{} was not committed after {} documents were deleted",
                    index + 1,
                    total_units,
                    deleted
                ))
            })?;

            deleted += unit.len();
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::StagedWrite;
    use crate::store::InMemoryStore;
    use std::collections::HashSet;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new().with("position", i as i64))
            .collect()
    }

    #[tokio::test]
    async fn test_chunks_in_input_order() {
        let store = InMemoryStore::new();
        let writer = BatchWriter::new(&store).with_limit(2).unwrap();

        let outcome = writer.write_all("categories", &records(5)).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.written(), 5);

        let sizes: Vec<_> = store.commits().iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let positions: Vec<_> = store
            .documents("categories")
            .into_iter()
            .map(|(_, r)| r)
            .collect();
        assert_eq!(positions, records(5));
    }

    #[tokio::test]
    async fn test_commit_count_is_ceiling() {
        for (n, limit, expected) in [(1, 500, 1), (500, 500, 1), (501, 500, 2), (7, 3, 3)] {
            let store = InMemoryStore::new();
            let writer = BatchWriter::new(&store).with_limit(limit).unwrap();
            writer.write_all("popular_products", &records(n)).await;
            let commits = store.commits();
            assert_eq!(commits.len(), expected, "n={} limit={}", n, limit);
            assert!(commits.iter().all(|c| c.size >= 1 && c.size <= limit));
        }
    }

    #[tokio::test]
    async fn test_empty_records_is_noop() {
        let store = InMemoryStore::new();
        let outcome = BatchWriter::new(&store).write_all("banners", &[]).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.written(), 0);
        assert!(store.commits().is_empty());
    }

    #[tokio::test]
    async fn test_stops_at_first_failed_unit() {
        let store = InMemoryStore::new().fail_commit(1);
        let writer = BatchWriter::new(&store).with_limit(2).unwrap();

        let outcome = writer.write_all("categories", &records(5)).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.written(), 2);
        assert_eq!(store.count("categories"), 2);

        // the third unit is never attempted
        assert_eq!(store.commits().len(), 2);

        let message = format!("{:#}", outcome.error().unwrap());
        assert!(message.contains("write unit 2/3"));
        assert!(message.contains("rejected by in-memory store"));
    }

    #[tokio::test]
    async fn test_ids_are_fresh() {
        let store = InMemoryStore::new();
        let writer = BatchWriter::new(&store);
        writer.write_all("banners", &records(50)).await;
        writer.write_all("banners", &records(50)).await;

        let ids: HashSet<_> = store
            .documents("banners")
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_invalid_limits() {
        let store = InMemoryStore::new();
        assert!(BatchWriter::new(&store).with_limit(0).is_err());
        assert!(BatchWriter::new(&store).with_limit(501).is_err());
        assert_eq!(BatchWriter::new(&store).with_limit(500).unwrap().limit(), 500);
    }

    #[tokio::test]
    async fn test_clear_deletes_in_units() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.insert("banners", DocumentId::new(format!("doc-{}", i)), Record::new());
        }
        let writer = BatchWriter::new(&store).with_limit(2).unwrap();

        assert_eq!(writer.clear("banners").await.unwrap(), 5);
        assert_eq!(store.count("banners"), 0);
        let sizes: Vec<_> = store.commits().iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_clear_empty_collection() {
        let store = InMemoryStore::new();
        assert_eq!(BatchWriter::new(&store).clear("banners").await.unwrap(), 0);
        assert!(store.commits().is_empty());
    }

    #[tokio::test]
    async fn test_clear_failure_reports_progress() {
        let store = InMemoryStore::new().fail_commit(1);
        for i in 0..3 {
            store.insert("banners", DocumentId::new(format!("doc-{}", i)), Record::new());
        }
        let writer = BatchWriter::new(&store).with_limit(2).unwrap();

        let err = writer.clear("banners").await.unwrap_err();
        assert!(err.to_string().contains("after 2 documents were deleted"));
        assert_eq!(store.count("banners"), 1);
    }

    #[test]
    fn test_staged_write_id() {
        let set = StagedWrite::Set {
            id: DocumentId::new("a"),
            record: Record::new(),
        };
        assert_eq!(set.id().as_str(), "a");
    }
}
