use crate::common::{
    Document, Value, DOC_ID, OPERATOR_MARKER, OP_INC, OP_PULL, OP_PUSH, OP_SET, OP_UNSET,
};
use crate::datastore::memory::matcher::value_matches;
use crate::errors::{AdapterError, AdapterResult, ErrorKind};

/// Computes the new version of `document` under a native delta.
///
/// A delta made of update operators is applied operator by operator; a
/// delta without operators replaces the document, keeping its `_id`.
pub(crate) fn apply_delta(document: &Document, delta: &Document) -> AdapterResult<Document> {
    let operators = delta
        .keys()
        .filter(|key| key.starts_with(OPERATOR_MARKER))
        .count();

    if operators == 0 {
        return replace(document, delta);
    }
    if operators != delta.len() {
        return Err(storage_error("You cannot mix modifiers and normal fields"));
    }

    let mut updated = document.clone();
    for (operator, operand) in delta.iter() {
        let fields = operand.as_document().ok_or_else(|| {
            storage_error(&format!("Modifier {}'s argument must be an object", operator))
        })?;

        for (path, value) in fields.iter() {
            if path == DOC_ID {
                return Err(storage_error("You cannot modify a document's _id"));
            }

            match operator.as_str() {
                OP_SET => set(&mut updated, path, value.clone())?,
                OP_UNSET => {
                    updated.remove_path(path);
                }
                OP_INC => inc(&mut updated, path, value)?,
                OP_PUSH => push(&mut updated, path, value.clone())?,
                OP_PULL => pull(&mut updated, path, value)?,
                _ => return Err(storage_error(&format!("Unknown modifier {}", operator))),
            }
        }
    }
    Ok(updated)
}

fn replace(document: &Document, replacement: &Document) -> AdapterResult<Document> {
    let mut updated = replacement.clone();
    match (document.id(), replacement.id()) {
        (Some(current), Some(requested)) if current != requested => {
            Err(storage_error("You cannot change a document's _id"))
        }
        (Some(current), _) => {
            updated.insert(DOC_ID, current.clone());
            Ok(updated)
        }
        _ => Ok(updated),
    }
}

fn set(document: &mut Document, path: &str, value: Value) -> AdapterResult<()> {
    document.set_path(path, value).map_err(|err| {
        AdapterError::new_with_cause(
            &format!("Cannot set field {}", path),
            ErrorKind::StorageError,
            err,
        )
    })
}

fn inc(document: &mut Document, path: &str, amount: &Value) -> AdapterResult<()> {
    if !amount.is_number() {
        return Err(storage_error(&format!("{} must be a number", amount)));
    }

    let current = match document.get_path(path) {
        None => return set(document, path, amount.clone()),
        Some(current) => current,
    };

    let incremented = match (current, amount) {
        (Value::I64(a), Value::I64(b)) => Value::I64(a.wrapping_add(*b)),
        (current, amount) if current.is_number() => match (current.as_f64(), amount.as_f64()) {
            (Some(a), Some(b)) => Value::F64(a + b),
            _ => return Err(storage_error("Cannot increment a non-numeric value")),
        },
        _ => {
            return Err(storage_error(&format!(
                "Don't use the $inc modifier on non-number field {}",
                path
            )))
        }
    };
    set(document, path, incremented)
}

fn push(document: &mut Document, path: &str, value: Value) -> AdapterResult<()> {
    match document.get_path_mut(path) {
        None => set(document, path, Value::Array(vec![value])),
        Some(Value::Array(items)) => {
            items.push(value);
            Ok(())
        }
        Some(_) => Err(storage_error(&format!(
            "Can't $push an element on non-array field {}",
            path
        ))),
    }
}

fn pull(document: &mut Document, path: &str, condition: &Value) -> AdapterResult<()> {
    let items = match document.get_path_mut(path) {
        None => return Ok(()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(storage_error(&format!(
                "Can't $pull an element from non-array field {}",
                path
            )))
        }
    };

    let mut kept = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if !value_matches(&item, condition)? {
            kept.push(item);
        }
    }
    *items = kept;
    Ok(())
}

fn storage_error(message: &str) -> AdapterError {
    AdapterError::new(message, ErrorKind::StorageError)
}
