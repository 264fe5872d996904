use crate::common::{Document, Value};
use crate::datastore::EnsureIndexOptions;
use crate::errors::{AdapterError, AdapterResult, ErrorKind};

/// Index definition of a [crate::datastore::MemoryDatastore].
///
/// Only constraints are tracked; lookups scan the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MemoryIndex {
    field_name: String,
    unique: bool,
    sparse: bool,
}

impl MemoryIndex {
    pub(crate) fn new(options: &EnsureIndexOptions) -> Self {
        MemoryIndex {
            field_name: options.field_name.clone(),
            unique: options.unique,
            sparse: options.sparse,
        }
    }

    pub(crate) fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Checks the unique constraint over a prospective collection state.
    ///
    /// A document missing the field counts as `null` unless the index is
    /// sparse, in which case it is not indexed at all.
    pub(crate) fn validate<'a, I>(&self, documents: I) -> AdapterResult<()>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        if !self.unique {
            return Ok(());
        }

        let null = Value::Null;
        let mut keys: Vec<&Value> = Vec::new();
        for document in documents {
            match document.get_path(&self.field_name) {
                Some(value) if !value.is_null() => keys.push(value),
                _ if self.sparse => {}
                _ => keys.push(&null),
            }
        }

        keys.sort_by(|a, b| a.sort_cmp(b));
        if let Some(pair) = keys.windows(2).find(|pair| pair[0] == pair[1]) {
            log::error!(
                "Unique constraint violated for field {} with key {}",
                self.field_name,
                pair[0]
            );
            return Err(AdapterError::new(
                &format!(
                    "Can't insert key {}, it violates the unique constraint on {}",
                    pair[0], self.field_name
                ),
                ErrorKind::UniqueConstraintViolation,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn unique(sparse: bool) -> MemoryIndex {
        MemoryIndex::new(&EnsureIndexOptions::new("email").unique(true).sparse(sparse))
    }

    #[test]
    fn test_plain_index_accepts_duplicates() {
        let index = MemoryIndex::new(&EnsureIndexOptions::new("email"));
        let documents = [doc! { email: "a" }, doc! { email: "a" }];
        assert!(index.validate(documents.iter()).is_ok());
        assert_eq!(index.field_name(), "email");
    }

    #[test]
    fn test_unique_index_rejects_duplicates() {
        let documents = [doc! { email: "a" }, doc! { email: "b" }, doc! { email: "a" }];
        let err = unique(false).validate(documents.iter()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);
    }

    #[test]
    fn test_missing_fields() {
        let documents = [doc! { email: "a" }, doc! { name: "x" }, doc! { name: "y" }];
        assert!(unique(false).validate(documents.iter()).is_err());
        assert!(unique(true).validate(documents.iter()).is_ok());
    }

    #[test]
    fn test_numbers_compare_numerically() {
        let documents = [doc! { email: 1 }, doc! { email: 1.0 }];
        assert!(unique(false).validate(documents.iter()).is_err());
    }

    #[test]
    fn test_documents_with_reordered_fields_collide() {
        let index = MemoryIndex::new(&EnsureIndexOptions::new("k").unique(true));
        let documents = [
            doc! { k: { a: 1, b: 2 } },
            doc! { k: { a: 1, c: 0 } },
            doc! { k: { b: 2, a: 1 } },
        ];
        let err = index.validate(documents.iter()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);

        let documents = [doc! { k: { a: 1, b: 2 } }, doc! { k: { b: 1, a: 2 } }];
        assert!(index.validate(documents.iter()).is_ok());
    }
}
