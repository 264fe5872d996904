use crate::common::{Document, Value, OP_IN, OP_PULL, OP_UNSET};
use crate::query::AbstractDelta;
use crate::translate::NativeDelta;

/// Translates an [AbstractDelta] into a native update document.
///
/// - `$unset: [a, b]` becomes `$unset: { a: true, b: true }`
/// - `$pull: { f: [x, y] }` becomes `$pull: { f: { $in: [x, y] } }`
/// - every other tag is copied unchanged
///
/// Operands of the wrong shape are forwarded as they are.
pub fn translate_delta(delta: &AbstractDelta) -> NativeDelta {
    let mut native = Document::new();
    for (tag, operand) in delta.iter() {
        let value = match (tag.as_str(), operand) {
            (OP_UNSET, Value::Array(paths)) => Value::Document(unset_marks(paths)),
            (OP_PULL, Value::Document(fields)) => Value::Document(pull_filters(fields)),
            (_, operand) => operand.clone(),
        };
        native.insert(tag.as_str(), value);
    }
    native
}

fn unset_marks(paths: &[Value]) -> Document {
    let mut marks = Document::new();
    for path in paths {
        let key = match path {
            Value::String(path) => path.clone(),
            other => other.to_string(),
        };
        marks.insert(key, true);
    }
    marks
}

fn pull_filters(fields: &Document) -> Document {
    let mut filters = Document::new();
    for (path, values) in fields.iter() {
        let mut containment = Document::new();
        containment.insert(OP_IN, values.clone());
        filters.insert(path.as_str(), containment);
    }
    filters
}
