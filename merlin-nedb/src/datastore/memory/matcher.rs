use crate::common::{
    split_path, Document, Value, OPERATOR_MARKER, OP_AND, OP_EQ, OP_EXISTS, OP_GT, OP_GTE, OP_IN,
    OP_LT, OP_LTE, OP_NE, OP_NIN, OP_NOT, OP_OR, OP_REGEX,
};
use crate::errors::{AdapterError, AdapterResult, ErrorKind};
use std::cmp::Ordering;

/// Evaluates a native filter against a stored document.
pub(crate) fn matches(document: &Document, filter: &Document) -> AdapterResult<bool> {
    for (key, condition) in filter.iter() {
        let matched = if key.starts_with(OPERATOR_MARKER) {
            match_logical(document, key, condition)?
        } else {
            let values = resolve(document, key);
            match_condition(&values, condition)?
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluates a field condition (a literal or an operator document) against
/// a single value. Used by `$pull`.
pub(crate) fn value_matches(value: &Value, condition: &Value) -> AdapterResult<bool> {
    match_condition(&[value], condition)
}

fn match_logical(document: &Document, operator: &str, operand: &Value) -> AdapterResult<bool> {
    match operator {
        OP_AND | OP_OR => {
            let sub_filters = operand.as_array().ok_or_else(|| {
                storage_error(&format!("{} operator used without an array", operator))
            })?;

            let mut any = false;
            for sub_filter in sub_filters {
                let sub_filter = sub_filter.as_document().ok_or_else(|| {
                    storage_error(&format!("{} operator expects an array of documents", operator))
                })?;
                let matched = matches(document, sub_filter)?;
                if operator == OP_AND && !matched {
                    return Ok(false);
                }
                any |= matched;
            }
            Ok(operator == OP_AND || any)
        }
        OP_NOT => {
            let sub_filter = operand
                .as_document()
                .ok_or_else(|| storage_error("$not operator expects a document"))?;
            Ok(!matches(document, sub_filter)?)
        }
        _ => Err(storage_error(&format!("Unknown logical operator {}", operator))),
    }
}

fn match_condition(values: &[&Value], condition: &Value) -> AdapterResult<bool> {
    if let Value::Document(operators) = condition {
        if is_operator_document(operators)? {
            for (operator, operand) in operators.iter() {
                if !match_operator(values, operator, operand)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
    }

    match condition {
        Value::Regex(pattern) => Ok(values
            .iter()
            .flat_map(|value| candidates(value))
            .any(|value| value.as_string().is_some_and(|text| pattern.is_match(text)))),
        literal => Ok(equals_any(values, literal)),
    }
}

fn match_operator(values: &[&Value], operator: &str, operand: &Value) -> AdapterResult<bool> {
    match operator {
        OP_EQ => Ok(equals_any(values, operand)),
        OP_NE => Ok(!equals_any(values, operand)),
        OP_GT => Ok(compares(values, operand, |ord| ord == Ordering::Greater)),
        OP_GTE => Ok(compares(values, operand, |ord| ord != Ordering::Less)),
        OP_LT => Ok(compares(values, operand, |ord| ord == Ordering::Less)),
        OP_LTE => Ok(compares(values, operand, |ord| ord != Ordering::Greater)),
        OP_IN => {
            let options = array_operand(operator, operand)?;
            Ok(options.iter().any(|option| equals_any(values, option)))
        }
        OP_NIN => {
            let options = array_operand(operator, operand)?;
            Ok(!options.iter().any(|option| equals_any(values, option)))
        }
        OP_EXISTS => {
            let expected = truthy(operand);
            Ok(values.is_empty() != expected)
        }
        OP_REGEX => {
            let pattern = operand
                .as_pattern()
                .ok_or_else(|| storage_error("$regex operator expects a regular expression"))?;
            Ok(values
                .iter()
                .flat_map(|value| candidates(value))
                .any(|value| value.as_string().is_some_and(|text| pattern.is_match(text))))
        }
        _ => Err(storage_error(&format!("Unknown comparison function {}", operator))),
    }
}

/// A document is an operator document when its keys are operators. Mixing
/// operators and plain fields is rejected.
fn is_operator_document(document: &Document) -> AdapterResult<bool> {
    let operators = document
        .keys()
        .filter(|key| key.starts_with(OPERATOR_MARKER))
        .count();
    if operators > 0 && operators != document.len() {
        return Err(storage_error("You cannot mix operators and normal fields"));
    }
    Ok(operators > 0)
}

fn equals_any(values: &[&Value], expected: &Value) -> bool {
    values.iter().any(|value| {
        *value == expected
            || matches!(value, Value::Array(items) if items.iter().any(|item| item == expected))
    })
}

fn compares(values: &[&Value], operand: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    values
        .iter()
        .flat_map(|value| candidates(value))
        .any(|value| value.compare(operand).is_some_and(&accept))
}

/// The value itself, or the elements of an array value.
fn candidates(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn array_operand<'a>(operator: &str, operand: &'a Value) -> AdapterResult<&'a Vec<Value>> {
    operand
        .as_array()
        .ok_or_else(|| storage_error(&format!("{} operator called with a non-array", operator)))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::I64(number) => *number != 0,
        Value::F64(number) => *number != 0.0,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

/// Collects the values a dotted path reaches. A non-numeric segment applied
/// to an array fans out over its document elements.
pub(crate) fn resolve<'a>(document: &'a Document, path: &str) -> Vec<&'a Value> {
    let segments = split_path(path);
    let mut values = Vec::new();
    if let Some((first, rest)) = segments.split_first() {
        if let Some(value) = document.get(first) {
            descend(value, rest, &mut values);
        }
    }
    values
}

fn descend<'a>(value: &'a Value, segments: &[&str], values: &mut Vec<&'a Value>) {
    let (segment, rest) = match segments.split_first() {
        Some(split) => split,
        None => {
            values.push(value);
            return;
        }
    };

    match value {
        Value::Document(document) => {
            if let Some(child) = document.get(segment) {
                descend(child, rest, values);
            }
        }
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(position) => {
                if let Some(child) = items.get(position) {
                    descend(child, rest, values);
                }
            }
            Err(_) => {
                for item in items.iter().filter(|item| item.is_document()) {
                    descend(item, segments, values);
                }
            }
        },
        _ => {}
    }
}

fn storage_error(message: &str) -> AdapterError {
    AdapterError::new(message, ErrorKind::StorageError)
}
