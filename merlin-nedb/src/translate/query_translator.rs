use crate::common::{Document, Value, OP_NE, OP_NIN, OP_REGEX};
use crate::query::{AbstractQuery, FilterNode, FilterTree, Operator, OperatorSet};
use crate::translate::NativeFilter;

/// Translates the filter of an [AbstractQuery] into a native filter.
///
/// Pagination and sort are not part of the native filter; see
/// [`crate::translate::translate_sort`].
pub fn translate_query(query: &AbstractQuery) -> NativeFilter {
    translate_filter(query.filter())
}

/// Translates a [FilterTree], recursing into sub-trees.
pub fn translate_filter(tree: &FilterTree) -> NativeFilter {
    let mut native = Document::new();
    for (path, node) in tree.iter() {
        let value = match node {
            FilterNode::Literal(value) => value.clone(),
            FilterNode::Operator(operators) => Value::Document(translate_operators(operators)),
            FilterNode::Regex(pattern) => {
                let mut regex = Document::new();
                regex.insert(OP_REGEX, pattern.clone());
                Value::Document(regex)
            }
            FilterNode::SubTree(sub_tree) => Value::Document(translate_filter(sub_tree)),
        };
        native.insert(path.as_str(), value);
    }
    native
}

fn translate_operators(operators: &OperatorSet) -> Document {
    let mut native = Document::new();
    for (operator, operand) in operators.iter() {
        let tag = match operator {
            Operator::NotIn => OP_NIN,
            Operator::Not => OP_NE,
            other => other.tag(),
        };
        native.insert(tag, operand.clone());
    }
    native
}
