use indexmap::IndexMap;

/// Sort weight for ascending order.
pub const ASCENDING_WEIGHT: i32 = 1;

/// Sort weight for descending order.
pub const DESCENDING_WEIGHT: i32 = -1;

/// A sort specification in the datastore's dialect: field path -> weight.
///
/// Iteration order is precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeSort {
    weights: IndexMap<String, i32>,
}

impl NativeSort {
    pub fn new() -> Self {
        NativeSort {
            weights: IndexMap::new(),
        }
    }

    /// Sets the weight of a field. A field that is already present keeps its
    /// precedence and takes the new weight.
    pub fn insert(&mut self, field: &str, weight: i32) {
        self.weights.insert(field.to_string(), weight);
    }

    pub fn weight(&self, field: &str) -> Option<i32> {
        self.weights.get(field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &i32)> {
        self.weights.iter()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, i32)> for NativeSort {
    fn from_iter<I: IntoIterator<Item = (&'a str, i32)>>(iter: I) -> Self {
        let mut sort = NativeSort::new();
        for (field, weight) in iter {
            sort.insert(field, weight);
        }
        sort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut sort = NativeSort::new();
        sort.insert("a", 1);
        sort.insert("b", -1);
        sort.insert("a", -1);

        let entries: Vec<(&String, &i32)> = sort.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "a");
        assert_eq!(sort.weight("a"), Some(-1));
    }

    #[test]
    fn test_from_iter() {
        let sort: NativeSort = vec![("x", ASCENDING_WEIGHT), ("y", DESCENDING_WEIGHT)].into_iter().collect();
        assert_eq!(sort.len(), 2);
        assert_eq!(sort.weight("y"), Some(-1));
        assert!(!sort.is_empty());
    }
}
