use crate::common::{Document, Value, OP_INC, OP_PULL, OP_PUSH, OP_SET, OP_UNSET};
use indexmap::IndexMap;

/// A backend-agnostic mutation: update operator tag -> operand.
///
/// Operands follow the ORM's conventions:
/// - `$set`, `$inc`, `$push`: a document of field path -> value
/// - `$unset`: an array of field paths
/// - `$pull`: a document of field path -> array of values to remove
///
/// Tags are unique; adding a tag twice merges document operands and
/// replaces anything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbstractDelta {
    diff: IndexMap<String, Value>,
}

impl AbstractDelta {
    pub fn new() -> Self {
        AbstractDelta {
            diff: IndexMap::new(),
        }
    }

    pub fn set<T: Into<Value>>(self, field_path: &str, value: T) -> Self {
        self.field_operand(OP_SET, field_path, value.into())
    }

    pub fn inc<T: Into<Value>>(self, field_path: &str, amount: T) -> Self {
        self.field_operand(OP_INC, field_path, amount.into())
    }

    pub fn push<T: Into<Value>>(self, field_path: &str, value: T) -> Self {
        self.field_operand(OP_PUSH, field_path, value.into())
    }

    /// Removes the given field paths.
    pub fn unset(mut self, field_paths: Vec<&str>) -> Self {
        let mut paths = match self.diff.shift_remove(OP_UNSET) {
            Some(Value::Array(existing)) => existing,
            _ => Vec::new(),
        };
        paths.extend(field_paths.into_iter().map(Value::from));
        self.diff.insert(OP_UNSET.to_string(), Value::Array(paths));
        self
    }

    /// Removes every element of the array at `field_path` equal to one of `values`.
    pub fn pull<T: Into<Value>>(self, field_path: &str, values: Vec<T>) -> Self {
        self.field_operand(OP_PULL, field_path, Value::from_vec(values))
    }

    /// Adds any operator with a raw operand.
    pub fn operator<T: Into<Value>>(mut self, tag: &str, operand: T) -> Self {
        self.diff.insert(tag.to_string(), operand.into());
        self
    }

    pub fn get(&self, tag: &str) -> Option<&Value> {
        self.diff.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.diff.iter()
    }

    pub fn len(&self) -> usize {
        self.diff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }

    fn field_operand(mut self, tag: &str, field_path: &str, value: Value) -> Self {
        let entry = self
            .diff
            .entry(tag.to_string())
            .or_insert_with(|| Value::Document(Document::new()));
        match entry {
            Value::Document(doc) => {
                doc.insert(field_path, value);
            }
            other => {
                let mut doc = Document::new();
                doc.insert(field_path, value);
                *other = Value::Document(doc);
            }
        }
        self
    }
}

impl From<Document> for AbstractDelta {
    fn from(document: Document) -> Self {
        AbstractDelta {
            diff: document.into_iter().collect(),
        }
    }
}
