//! Seed sources
//!
//! A seed source yields the ordered list of collections to populate. The
//! order of the returned targets is the order they are written in.

use super::{CollectionTarget, Record};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of collection targets to seed
///
/// # Example
/// ```
/// use seedr::seed::{CollectionTarget, Record, SeedSource};
///
/// struct OneBanner;
///
/// impl SeedSource for OneBanner {
///     fn list(&self) -> eyre::Result<Vec<CollectionTarget>> {
///         let banner = Record::new().with("subtitle", "On Shopee");
///         Ok(vec![CollectionTarget::new("banners", vec![banner])?])
///     }
/// }
///
/// assert_eq!(OneBanner.list().unwrap().len(), 1);
/// ```
pub trait SeedSource {
    /// List the targets in write order
    ///
    /// # Errors
    /// Returns an error if the underlying data cannot be read or parsed.
    fn list(&self) -> Result<Vec<CollectionTarget>>;
}

impl<S: SeedSource + ?Sized> SeedSource for Box<S> {
    fn list(&self) -> Result<Vec<CollectionTarget>> {
        (**self).list()
    }
}

/// Seed source over targets that are already in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSeed {
    targets: Vec<CollectionTarget>,
}

impl StaticSeed {
    pub fn new(targets: Vec<CollectionTarget>) -> Self {
        Self { targets }
    }
}

impl SeedSource for StaticSeed {
    fn list(&self) -> Result<Vec<CollectionTarget>> {
        Ok(self.targets.clone())
    }
}

/// On-disk seed document layout
///
/// Example format:
/// ```yaml
/// collections:
///   - name: banners
///     records:
///       - titlePart1: "Shop with "
///         subtitle: On Shopee
///   - name: categories
///     records:
///       - name: More
///         iconName: more_horiz
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeedDocument {
    #[serde(default)]
    pub collections: Vec<SeedCollection>,
}

/// One collection entry in a [`SeedDocument`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedCollection {
    pub name: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

/// File formats a seed document can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Yaml,
    Json,
    Json5,
}

impl SeedFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("yml") | Some("yaml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("json5") => Ok(Self::Json5),
            _ => eyre::bail!(
                "Unsupported seed file extension: {} (expected .yml, .yaml, .json or .json5)",
                path.display()
            ),
        }
    }
}

/// Seed source backed by a YAML, JSON or JSON5 file
pub struct SeedFile {
    path: PathBuf,
}

impl SeedFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the seed document
    pub fn read(&self) -> Result<SeedDocument> {
        let format = SeedFormat::from_path(&self.path)?;
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read seed file: {}", self.path.display()))?;

        log::debug!("Parsing {:?} seed file {}", format, self.path.display());

        let document = match format {
            SeedFormat::Yaml => serde_yaml::from_str(&content)
                .with_context(|| "Failed to parse seed file YAML")?,
            SeedFormat::Json => serde_json::from_str(&content)
                .with_context(|| "Failed to parse seed file JSON")?,
            SeedFormat::Json5 => json5::from_str(&content)
                .with_context(|| "Failed to parse seed file JSON5")?,
        };

        Ok(document)
    }
}

impl SeedSource for SeedFile {
    fn list(&self) -> Result<Vec<CollectionTarget>> {
        let document = self.read()?;
        document
            .collections
            .into_iter()
            .map(|c| {
                CollectionTarget::new(c.name, c.records)
                    .with_context(|| format!("Invalid collection in {}", self.path.display()))
            })
            .collect()
    }
}
