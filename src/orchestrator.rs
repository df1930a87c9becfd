//! Population run orchestration
//!
//! Walks the collection targets in order, writes each one through the
//! [`BatchWriter`], and reports every outcome. A failed collection is
//! recorded and the run moves on to the next one.

use crate::batch::{BatchWriter, WriteOutcome};
use crate::report::{Reporter, RunEvent};
use crate::seed::CollectionTarget;
use crate::store::Datastore;
use owo_colors::OwoColorize;

/// Process exit code when every collection was populated
pub const EXIT_SUCCESS: u8 = 0;
/// Process exit code when the run could not be initialized
pub const EXIT_INIT_FAILURE: u8 = 1;
/// Process exit code when the run finished but some collections failed
pub const EXIT_PARTIAL_FAILURE: u8 = 2;

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// Processing the target at this index
    Running(usize),
    Finished,
}

/// Ordered outcomes of a finished run
#[derive(Debug, Default)]
pub struct RunSummary {
    outcomes: Vec<WriteOutcome>,
}

impl RunSummary {
    pub fn outcomes(&self) -> &[WriteOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, collection: &str) -> Option<&WriteOutcome> {
        self.outcomes.iter().find(|o| o.collection() == collection)
    }

    pub fn total_written(&self) -> usize {
        self.outcomes.iter().map(|o| o.written()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &WriteOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_success())
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_PARTIAL_FAILURE
        }
    }
}

/// Drives a population run over a single datastore session
///
/// # Example
/// ```
/// use seedr::orchestrator::{Orchestrator, RunState};
/// use seedr::report::ConsoleReporter;
/// use seedr::seed::{EmbeddedSeed, SeedSource};
/// use seedr::store::InMemoryStore;
///
/// # async fn example() -> eyre::Result<()> {
/// let store = InMemoryStore::new();
/// let mut orchestrator = Orchestrator::new(&store, ConsoleReporter);
///
/// let summary = orchestrator.run(&EmbeddedSeed.list()?).await;
/// assert!(summary.is_success());
/// assert_eq!(orchestrator.state(), RunState::Finished);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator<'a, D: ?Sized, R> {
    writer: BatchWriter<'a, D>,
    reporter: R,
    clear_first: bool,
    state: RunState,
}

impl<'a, D: Datastore + ?Sized, R: Reporter> Orchestrator<'a, D, R> {
    pub fn new(store: &'a D, reporter: R) -> Self {
        Self::with_writer(BatchWriter::new(store), reporter)
    }

    /// Use a preconfigured writer (for a non-default unit limit)
    pub fn with_writer(writer: BatchWriter<'a, D>, reporter: R) -> Self {
        Self {
            writer,
            reporter,
            clear_first: false,
            state: RunState::Idle,
        }
    }

    /// Delete each collection's existing documents before writing to it
    pub fn clear_first(mut self, clear: bool) -> Self {
        self.clear_first = clear;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Populate every target in order
    ///
    /// Always attempts every target. Each outcome, successful or not, is
    /// reported and returned in target order.
    pub async fn run(&mut self, targets: &[CollectionTarget]) -> RunSummary {
        self.reporter.report(&RunEvent::RunStarted);
        log::info!("Populating {} collection(s)", targets.len().cyan());

        let mut outcomes = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            self.state = RunState::Running(index);
            let outcome = self.populate(target).await;

            match outcome.error() {
                None => self.reporter.report(&RunEvent::CollectionSucceeded {
                    collection: target.name(),
                    count: outcome.written(),
                }),
                Some(error) => {
                    log::debug!(
                        "'{}' failed after {} documents, continuing",
                        target.name().cyan(),
                        outcome.written()
                    );
                    self.reporter.report(&RunEvent::CollectionFailed {
                        collection: target.name(),
                        error,
                    })
                }
            }
            outcomes.push(outcome);
        }

        self.state = RunState::Finished;
        self.reporter.report(&RunEvent::RunFinished);

        let summary = RunSummary { outcomes };
        let failed = summary.failures().count();
        if failed == 0 {
            log::info!(
                "✓ Wrote {} document(s) across {} collection(s)",
                summary.total_written().green(),
                targets.len()
            );
        } else {
            log::warn!(
                "Wrote {} document(s), {} of {} collection(s) failed",
                summary.total_written(),
                failed.red(),
                targets.len()
            );
        }
        summary
    }

    async fn populate(&self, target: &CollectionTarget) -> WriteOutcome {
        if self.clear_first {
            match self.writer.clear(target.name()).await {
                Ok(count) => self.reporter.report(&RunEvent::CollectionCleared {
                    collection: target.name(),
                    count,
                }),
                Err(e) => {
                    return WriteOutcome::failed(
                        target.name(),
                        0,
                        e.wrap_err("clearing existing documents failed"),
                    );
                }
            }
        }

        self.writer.write_all(target.name(), target.records()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Record;
    use crate::store::{DocumentId, InMemoryStore};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter(Mutex<Vec<String>>);

    impl RecordingReporter {
        fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Reporter for RecordingReporter {
        fn report(&self, event: &RunEvent<'_>) {
            self.0.lock().unwrap().push(event.to_string());
        }
    }

    fn target(name: &str, n: usize) -> CollectionTarget {
        let records = (0..n).map(|i| Record::new().with("n", i as i64)).collect();
        CollectionTarget::new(name, records).unwrap()
    }

    #[tokio::test]
    async fn test_failure_isolation() {
        let store = InMemoryStore::new().fail_collection("b");
        let reporter = RecordingReporter::default();
        let mut orchestrator = Orchestrator::new(&store, &reporter);

        let summary = orchestrator
            .run(&[target("a", 2), target("b", 3), target("c", 4)])
            .await;

        assert_eq!(store.count("a"), 2);
        assert_eq!(store.count("b"), 0);
        assert_eq!(store.count("c"), 4);
        assert!(!summary.is_success());
        assert_eq!(summary.exit_code(), EXIT_PARTIAL_FAILURE);
        assert_eq!(summary.failures().count(), 1);

        let lines = reporter.lines();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Starting population run");
        assert_eq!(lines[1], "Successfully populated 2 documents in 'a'");
        assert!(lines[2].starts_with("Error populating 'b': "));
        assert_eq!(lines[3], "Successfully populated 4 documents in 'c'");
        assert_eq!(lines[4], "Population run finished");
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let store = InMemoryStore::new();
        let mut orchestrator = Orchestrator::new(&store, RecordingReporter::default());
        assert_eq!(orchestrator.state(), RunState::Idle);

        let summary = orchestrator.run(&[target("a", 1)]).await;
        assert_eq!(orchestrator.state(), RunState::Finished);
        assert_eq!(summary.exit_code(), EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_empty_target_is_success() {
        let store = InMemoryStore::new();
        let reporter = RecordingReporter::default();
        let summary = Orchestrator::new(&store, &reporter)
            .run(&[target("banners", 0)])
            .await;

        assert!(summary.is_success());
        assert_eq!(summary.outcome("banners").unwrap().written(), 0);
        assert_eq!(
            reporter.lines()[1],
            "Successfully populated 0 documents in 'banners'"
        );
    }

    #[tokio::test]
    async fn test_no_targets() {
        let store = InMemoryStore::new();
        let reporter = RecordingReporter::default();
        let summary = Orchestrator::new(&store, &reporter).run(&[]).await;

        assert!(summary.is_success());
        assert_eq!(
            reporter.lines(),
            vec!["Starting population run", "Population run finished"]
        );
    }

    #[tokio::test]
    async fn test_clear_first_replaces_documents() {
        let store = InMemoryStore::new();
        store.insert("a", DocumentId::new("old-1"), Record::new());
        store.insert("a", DocumentId::new("old-2"), Record::new());
        let reporter = RecordingReporter::default();

        let summary = Orchestrator::new(&store, &reporter)
            .clear_first(true)
            .run(&[target("a", 3)])
            .await;

        assert!(summary.is_success());
        assert_eq!(store.count("a"), 3);
        assert!(
            store
                .documents("a")
                .iter()
                .all(|(id, _)| !id.as_str().starts_with("old-"))
        );
        assert_eq!(reporter.lines()[1], "Cleared 2 documents from 'a'");
    }

    #[tokio::test]
    async fn test_failed_clear_skips_write() {
        let store = InMemoryStore::new().fail_collection("a");
        store.insert("a", DocumentId::new("old"), Record::new());

        let summary = Orchestrator::new(&store, RecordingReporter::default())
            .clear_first(true)
            .run(&[target("a", 3), target("b", 1)])
            .await;

        let a = summary.outcome("a").unwrap();
        assert!(!a.is_success());
        assert_eq!(a.written(), 0);
        assert!(format!("{:#}", a.error().unwrap()).contains("clearing existing documents failed"));
        // only the delete unit was attempted for 'a'
        assert_eq!(store.commits().iter().filter(|c| c.collection == "a").count(), 1);
        assert_eq!(store.count("b"), 1);
    }
}
