use super::Record;
use eyre::Result;

/// A named collection and the ordered records destined for it
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionTarget {
    name: String,
    records: Vec<Record>,
}

impl CollectionTarget {
    /// Create a new target
    ///
    /// # Errors
    /// Returns an error if `name` is empty or contains a `/`, which Firestore
    /// would interpret as a document path.
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            eyre::bail!("Collection name must not be empty");
        }
        if name.contains('/') {
            eyre::bail!("Collection name '{}' must not contain '/'", name);
        }
        Ok(Self { name, records })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
