use crate::query::SortSpec;
use crate::translate::{NativeSort, ASCENDING_WEIGHT, DESCENDING_WEIGHT};

/// Translates a [SortSpec] into native sort weights.
///
/// `"asc"` is the only direction producing ascending order; everything else
/// yields descending. When a field appears twice the last direction wins and
/// the field keeps the precedence of its first appearance. No sort, or an
/// empty one, means no sort.
pub fn translate_sort(sort: Option<&SortSpec>) -> Option<NativeSort> {
    let sort = sort?;
    if sort.is_empty() {
        return None;
    }

    let mut native = NativeSort::new();
    for entry in sort.entries() {
        let weight = if entry.is_ascending() {
            ASCENDING_WEIGHT
        } else {
            DESCENDING_WEIGHT
        };
        native.insert(entry.field(), weight);
    }
    Some(native)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{asc, desc, SortEntry};

    #[test]
    fn test_absent_sort() {
        assert_eq!(translate_sort(None), None);
        assert_eq!(translate_sort(Some(&SortSpec::new())), None);
    }

    #[test]
    fn test_directions() {
        let sort = SortSpec::new()
            .then(asc("a"))
            .then(desc("b"))
            .by("c", "")
            .by("d", "ascending")
            .by("e", "ASC");
        let native = translate_sort(Some(&sort)).unwrap();

        assert_eq!(native.weight("a"), Some(1));
        assert_eq!(native.weight("b"), Some(-1));
        assert_eq!(native.weight("c"), Some(-1));
        assert_eq!(native.weight("d"), Some(-1));
        assert_eq!(native.weight("e"), Some(-1));
    }

    #[test]
    fn test_precedence_follows_spec_order() {
        let sort = SortSpec::from(vec![desc("z"), asc("a"), asc("m")]);
        let native = translate_sort(Some(&sort)).unwrap();
        let fields: Vec<&String> = native.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_last_write_wins_on_collision() {
        let sort = SortSpec::from(vec![asc("a"), desc("b"), SortEntry::new("a", "desc")]);
        let native = translate_sort(Some(&sort)).unwrap();

        assert_eq!(native.len(), 2);
        assert_eq!(native.weight("a"), Some(-1));
        let fields: Vec<&String> = native.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }
}
