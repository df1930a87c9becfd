//! Firestore REST client and authentication.
//!
//! This module provides the [`FirestoreClient`] for committing write units to
//! Firestore, along with authentication types ([`Auth`], [`AuthType`]).

mod auth;
mod firestore;
mod value;

pub use auth::{Auth, AuthType};
pub use firestore::{DEFAULT_BASE_URL, DEFAULT_DATABASE, FirestoreClient};
pub use value::{encode_fields, encode_value};
