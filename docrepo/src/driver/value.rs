use crate::common::FIELD_SEPARATOR;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// The driver-level representation of a stored document: a JSON object.
pub type RawDocument = Map<String, Value>;

/// Looks up a possibly nested field (`"address.city"`) in a raw document.
pub fn field_value<'a>(document: &'a RawDocument, path: &str) -> Option<&'a Value> {
    let mut segments = path.split(FIELD_SEPARATOR);
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes a possibly nested field, creating intermediate objects on the way.
pub fn set_field(document: &mut RawDocument, path: &str, value: Value) -> RepositoryResult<()> {
    match path.split_once(FIELD_SEPARATOR) {
        None => {
            document.insert(path.to_string(), value);
            Ok(())
        }
        Some((head, rest)) => {
            let child = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if child.is_null() {
                *child = Value::Object(Map::new());
            }
            match child {
                Value::Object(map) => set_field(map, rest, value),
                other => {
                    log::error!("Cannot set field {} inside non-object value {}", path, other);
                    Err(RepositoryError::new(
                        &format!("Cannot set field '{}': '{}' is not an object", path, head),
                        ErrorKind::UpdateError,
                    ))
                }
            }
        }
    }
}

/// Removes a possibly nested field and returns its previous value.
pub fn remove_field(document: &mut RawDocument, path: &str) -> Option<Value> {
    match path.split_once(FIELD_SEPARATOR) {
        None => document.remove(path),
        Some((head, rest)) => match document.get_mut(head)? {
            Value::Object(map) => remove_field(map, rest),
            _ => None,
        },
    }
}

/// Compares two values of the same kind. Values of different kinds, arrays
/// and objects are not comparable.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        (Value::Number(l), Value::Number(r)) => {
            if let (Some(l), Some(r)) = (l.as_i64(), r.as_i64()) {
                return Some(l.cmp(&r));
            }
            if let (Some(l), Some(r)) = (l.as_u64(), r.as_u64()) {
                return Some(l.cmp(&r));
            }
            l.as_f64()?.partial_cmp(&r.as_f64()?)
        }
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Total order used for sorting: missing and null first, then booleans,
/// numbers, strings, arrays and objects; same-kind values by `compare_values`.
/// Arrays and objects compare by their serialized form, so equal ones sort
/// next to each other.
pub fn sort_order(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.unwrap_or(&Value::Null);
    let right = right.unwrap_or(&Value::Null);
    type_rank(left).cmp(&type_rank(right)).then_with(|| {
        compare_values(left, right).unwrap_or_else(|| left.to_string().cmp(&right.to_string()))
    })
}

/// Returns the numeric value of a field as `f64`, if it is a number.
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Interprets a JSON value as a raw document.
pub fn into_raw_document(value: Value) -> RepositoryResult<RawDocument> {
    match value {
        Value::Object(map) => Ok(map),
        other => {
            log::error!("Expected a JSON object for a document, got {}", other);
            Err(RepositoryError::new(
                "A document must serialize to an object",
                ErrorKind::ObjectMappingError,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RawDocument {
        into_raw_document(json!({
            "name": "order",
            "total": 42,
            "address": { "city": "Lyon", "zip": "69001" },
            "lines": [ { "sku": "a" }, { "sku": "b" } ]
        }))
        .unwrap()
    }

    #[test]
    fn test_field_value_top_level() {
        let document = sample();
        assert_eq!(field_value(&document, "total"), Some(&json!(42)));
    }

    #[test]
    fn test_field_value_nested() {
        let document = sample();
        assert_eq!(field_value(&document, "address.city"), Some(&json!("Lyon")));
        assert_eq!(field_value(&document, "lines.1.sku"), Some(&json!("b")));
        assert_eq!(field_value(&document, "address.country"), None);
        assert_eq!(field_value(&document, "name.first"), None);
    }

    #[test]
    fn test_set_field_creates_intermediate_objects() {
        let mut document = RawDocument::new();
        set_field(&mut document, "meta.audit.user", json!("bob")).unwrap();
        assert_eq!(field_value(&document, "meta.audit.user"), Some(&json!("bob")));
    }

    #[test]
    fn test_set_field_inside_scalar_fails() {
        let mut document = sample();
        let result = set_field(&mut document, "total.value", json!(1));
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::UpdateError);
    }

    #[test]
    fn test_remove_field() {
        let mut document = sample();
        assert_eq!(remove_field(&mut document, "address.zip"), Some(json!("69001")));
        assert_eq!(field_value(&document, "address.zip"), None);
        assert_eq!(remove_field(&mut document, "missing.path"), None);
    }

    #[test]
    fn test_compare_numbers_across_representations() {
        assert_eq!(compare_values(&json!(1), &json!(1.5)), Some(Ordering::Less));
        assert_eq!(compare_values(&json!(10), &json!(2)), Some(Ordering::Greater));
        assert_eq!(compare_values(&json!("a"), &json!(1)), None);
    }

    #[test]
    fn test_sort_order_puts_missing_first() {
        assert_eq!(sort_order(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(sort_order(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(sort_order(Some(&json!(3)), Some(&json!("a"))), Ordering::Less);
    }

    #[test]
    fn test_sort_order_separates_arrays_and_objects() {
        let a = json!(["a"]);
        let b = json!(["b"]);
        assert_eq!(sort_order(Some(&a), Some(&b)), Ordering::Less);
        assert_eq!(sort_order(Some(&b), Some(&a)), Ordering::Greater);
        assert_eq!(sort_order(Some(&a), Some(&json!(["a"]))), Ordering::Equal);
        assert_eq!(
            sort_order(Some(&json!({"k": 2})), Some(&json!({"k": 1}))),
            Ordering::Greater
        );
    }

    #[test]
    fn test_into_raw_document_rejects_scalars() {
        let result = into_raw_document(json!(5));
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::ObjectMappingError);
    }
}
