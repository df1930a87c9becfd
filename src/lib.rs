//! Seedr
//!
//! A batched seed loader that bootstraps Firestore collections with
//! reference documents.

pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod orchestrator;
pub mod report;
pub mod seed;
pub mod store;

// Re-exports for convenience
pub use batch::{BatchWriter, WriteOutcome, WriteUnit};
pub use client::{Auth, AuthType, FirestoreClient};
pub use config::SeedConfig;
pub use orchestrator::{Orchestrator, RunState, RunSummary};
pub use report::{ConsoleReporter, Reporter, RunEvent};
pub use seed::{CollectionTarget, EmbeddedSeed, FieldValue, Record, SeedFile, SeedSource};
pub use store::{Datastore, DocumentId, InMemoryStore};
