//! Seed data: records, collection targets, and the sources that provide them

mod embedded;
mod record;
mod source;
mod target;

pub use embedded::{BANNERS, CATEGORIES, EmbeddedSeed, POPULAR_PRODUCTS};
pub use record::{FieldValue, Record};
pub use source::{SeedCollection, SeedDocument, SeedFile, SeedFormat, SeedSource, StaticSeed};
pub use target::CollectionTarget;
