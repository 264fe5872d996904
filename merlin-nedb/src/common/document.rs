use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{AdapterError, AdapterResult, ErrorKind};
use indexmap::IndexMap;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{Debug, Display, Formatter};

type FieldVec<'a> = SmallVec<[&'a str; 8]>;

/// An insertion-ordered mapping from field name to [Value].
///
/// Documents model stored records as well as native filters and native
/// update deltas. Keys are stored as given: `insert("a.b", ..)` creates a key
/// named `a.b`, which is what native filters need. Use the `*_path` methods
/// to address embedded fields, e.g. `get_path("address.city")` or
/// `get_path("tags.0")`.
///
/// Equality ignores key order.
#[derive(Clone, Default, PartialEq)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Inserts a top-level key. An existing key keeps its position.
    pub fn insert<K: Into<String>, T: Into<Value>>(&mut self, key: K, value: T) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Removes a top-level key, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Returns the document identifier, if present.
    pub fn id(&self) -> Option<&Value> {
        self.data.get(DOC_ID)
    }

    /// Resolves a dot-delimited field path through embedded documents and
    /// numeric array positions.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let segments = split_path(path);
        let (first, rest) = segments.split_first()?;
        let mut current = self.data.get(*first)?;
        for segment in rest {
            current = match current {
                Value::Document(doc) => doc.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Sets the value at a dot-delimited path, creating embedded documents on
    /// the way.
    ///
    /// Fails when an intermediate segment holds a scalar.
    pub fn set_path<T: Into<Value>>(&mut self, path: &str, value: T) -> AdapterResult<()> {
        let segments = split_path(path);
        if segments.iter().any(|s| s.is_empty()) {
            log::error!("Invalid field path {:?}", path);
            return Err(AdapterError::new(
                &format!("Invalid field path '{}'", path),
                ErrorKind::InvalidArgument,
            ));
        }

        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => {
                return Err(AdapterError::new(
                    "Field path must not be empty",
                    ErrorKind::InvalidArgument,
                ))
            }
        };

        let mut current = self;
        for segment in parents {
            let entry = current
                .data
                .entry(segment.to_string())
                .or_insert_with(|| Value::Document(Document::new()));
            current = match entry {
                Value::Document(doc) => doc,
                _ => {
                    return Err(AdapterError::new(
                        &format!("Cannot create field '{}' inside a non-document value in '{}'", segment, path),
                        ErrorKind::InvalidArgument,
                    ))
                }
            };
        }
        current.data.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Mutable access to the value at a dot-delimited path.
    pub fn get_path_mut(&mut self, path: &str) -> Option<&mut Value> {
        let segments = split_path(path);
        let (first, rest) = segments.split_first()?;
        let mut current = self.data.get_mut(*first)?;
        for segment in rest {
            current = match current {
                Value::Document(doc) => doc.data.get_mut(*segment)?,
                Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Removes the value at a dot-delimited path.
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        match path.rsplit_once(FIELD_SEPARATOR) {
            None => self.remove(path),
            Some((parent, last)) => match self.get_path_mut(parent)? {
                Value::Document(doc) => doc.remove(last),
                _ => None,
            },
        }
    }

    pub(crate) fn to_json(&self) -> String {
        format!(
            "{{{}}}",
            self.data
                .iter()
                .map(|(key, value)| format!("\"{}\": {}", key, value.to_json()))
                .join(", ")
        )
    }
}

/// Splits a field path on the field separator.
pub(crate) fn split_path(path: &str) -> FieldVec<'_> {
    path.split(FIELD_SEPARATOR).collect()
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

/// Removes the surrounding quotes `stringify!` leaves on string-literal keys.
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] from key-value pairs.
///
/// Keys may be identifiers or string literals (use literals for dotted
/// paths). Values may be literals, expressions in parentheses, nested
/// documents `{ .. }` or arrays `[ .. ]`.
///
/// ```text
/// let base = 100;
/// let doc = doc! {
///     name: "Bob",
///     score: (base * 2),
///     "address.city": "Paris",
///     tags: ["a", "b"],
///     meta: { active: true },
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::common::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::common::Document::new();
            $(
                doc.insert($crate::common::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Helper macro converting values for [doc!].
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn set_up() -> Document {
        doc! {
            score: 1034,
            location: {
                state: "NY",
                address: {
                    line1: "40",
                    zip: 10001,
                },
            },
            category: ["food", "produce"],
            obj_array: [
                { value: 1 },
                { value: 2 },
            ],
        }
    }

    #[test]
    fn test_doc_macro_builds_nested_values() {
        let doc = set_up();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.get("score"), Some(&Value::I64(1034)));
        assert!(doc.get("location").map(|v| v.is_document()).unwrap_or(false));
    }

    #[test]
    fn test_doc_macro_string_keys_stay_flat() {
        let doc = doc! { "address.city": "Paris" };
        assert!(doc.contains_key("address.city"));
        assert_eq!(doc.get_path("address.city"), None);
    }

    #[test]
    fn test_get_path() {
        let doc = set_up();
        assert_eq!(doc.get_path("location.state"), Some(&Value::from("NY")));
        assert_eq!(doc.get_path("location.address.zip"), Some(&Value::I64(10001)));
        assert_eq!(doc.get_path("category.1"), Some(&Value::from("produce")));
        assert_eq!(doc.get_path("obj_array.0.value"), Some(&Value::I64(1)));
        assert_eq!(doc.get_path("location.missing"), None);
        assert_eq!(doc.get_path("score.nested"), None);
        assert_eq!(doc.get_path("category.x"), None);
    }

    #[test]
    fn test_set_path_creates_embedded_documents() {
        let mut doc = Document::new();
        doc.set_path("a.b.c", 1).unwrap();
        assert_eq!(doc.get_path("a.b.c"), Some(&Value::I64(1)));

        doc.set_path("a.b.d", "x").unwrap();
        assert_eq!(doc.get_path("a.b").and_then(|v| v.as_document()).map(|d| d.len()), Some(2));
    }

    #[test]
    fn test_set_path_through_scalar_fails() {
        let mut doc = set_up();
        let err = doc.set_path("score.value", 1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

        let err = doc.set_path("a..b", 1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_remove_path() {
        let mut doc = set_up();
        assert_eq!(doc.remove_path("location.address.zip"), Some(Value::I64(10001)));
        assert_eq!(doc.get_path("location.address.zip"), None);
        assert_eq!(doc.remove_path("score"), Some(Value::I64(1034)));
        assert_eq!(doc.remove_path("nothing.here"), None);
    }

    #[test]
    fn test_insert_keeps_position_on_overwrite() {
        let mut doc = doc! { a: 1, b: 2 };
        doc.insert("a", 3);
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&Value::I64(3)));
    }

    #[test]
    fn test_equality_ignores_order() {
        assert_eq!(doc! { a: 1, b: 2 }, doc! { b: 2, a: 1 });
    }

    #[test]
    fn test_display() {
        let doc = doc! { name: "test", tags: [1, 2] };
        assert_eq!(doc.to_string(), "{\"name\": \"test\", \"tags\": [1, 2]}");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("\"ABC\""), "ABC");
        assert_eq!(normalize("ABC"), "ABC");
    }
}
