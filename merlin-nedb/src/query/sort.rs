use crate::common::{SORT_ASCENDING, SORT_DESCENDING};

/// One `{ field: direction }` entry of a [SortSpec].
///
/// The direction is kept as the ORM sent it. Only `"asc"` sorts ascending;
/// any other string, including an empty one, sorts descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortEntry {
    field: String,
    direction: String,
}

impl SortEntry {
    pub fn new(field: &str, direction: &str) -> Self {
        SortEntry {
            field: field.to_string(),
            direction: direction.to_string(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    pub fn is_ascending(&self) -> bool {
        self.direction == SORT_ASCENDING
    }
}

/// Creates an ascending [SortEntry].
pub fn asc(field: &str) -> SortEntry {
    SortEntry::new(field, SORT_ASCENDING)
}

/// Creates a descending [SortEntry].
pub fn desc(field: &str) -> SortEntry {
    SortEntry::new(field, SORT_DESCENDING)
}

/// Ordered sort entries; earlier entries take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    entries: Vec<SortEntry>,
}

impl SortSpec {
    pub fn new() -> Self {
        SortSpec {
            entries: Vec::new(),
        }
    }

    /// Appends an entry with lower precedence than the existing ones.
    pub fn then(mut self, entry: SortEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Appends `{ field: direction }`.
    pub fn by(self, field: &str, direction: &str) -> Self {
        self.then(SortEntry::new(field, direction))
    }

    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<SortEntry>> for SortSpec {
    fn from(entries: Vec<SortEntry>) -> Self {
        SortSpec { entries }
    }
}
