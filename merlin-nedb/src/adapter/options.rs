use crate::common::{Document, DOC_ID, PLURAL_FOREIGN_KEY_TEMPLATE, SINGULAR_FOREIGN_KEY_TEMPLATE};

/// Per-call options of the CRUD operations.
///
/// - `single`: `update` touches at most one matching record
/// - `unique`, `sparse`: constraints of the index created by `index`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationOptions {
    pub single: bool,
    pub unique: bool,
    pub sparse: bool,
}

impl OperationOptions {
    pub fn new() -> Self {
        OperationOptions::default()
    }

    pub fn single(mut self, single: bool) -> Self {
        self.single = single;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }
}

/// Naming conventions the ORM must adopt for this adapter.
///
/// The ORM merges these into its own options; the adapter never writes to
/// ORM state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrmOptions {
    id_key: String,
    plural_foreign_key: String,
    singular_foreign_key: String,
}

impl OrmOptions {
    /// Identifier field of every record.
    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    /// Template of to-many foreign keys, `{modelName}` substituted by the ORM.
    pub fn plural_foreign_key(&self) -> &str {
        &self.plural_foreign_key
    }

    /// Template of to-one foreign keys, `{modelName}` substituted by the ORM.
    pub fn singular_foreign_key(&self) -> &str {
        &self.singular_foreign_key
    }

    /// The options as a document keyed the way the ORM names them.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("idKey", self.id_key.as_str());
        document.insert("pluralForeignKey", self.plural_foreign_key.as_str());
        document.insert("singularForeignKey", self.singular_foreign_key.as_str());
        document
    }
}

impl Default for OrmOptions {
    fn default() -> Self {
        OrmOptions {
            id_key: DOC_ID.to_string(),
            plural_foreign_key: PLURAL_FOREIGN_KEY_TEMPLATE.to_string(),
            singular_foreign_key: SINGULAR_FOREIGN_KEY_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_operation_options_default_to_false() {
        let options = OperationOptions::new();
        assert!(!options.single && !options.unique && !options.sparse);
        assert!(OperationOptions::new().single(true).single);
    }

    #[test]
    fn test_orm_options() {
        let options = OrmOptions::default();
        assert_eq!(options.id_key(), "_id");
        assert_eq!(options.plural_foreign_key(), "_{modelName}Ids");
        assert_eq!(options.singular_foreign_key(), "_{modelName}Id");
        assert_eq!(
            options.to_document(),
            doc! {
                idKey: "_id",
                pluralForeignKey: "_{modelName}Ids",
                singularForeignKey: "_{modelName}Id",
            }
        );
    }
}
