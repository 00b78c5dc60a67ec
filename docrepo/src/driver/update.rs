use crate::common::DOC_ID;
use crate::driver::value::{field_value, remove_field, set_field, RawDocument};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use serde_json::{Number, Value};
use std::fmt::{Display, Formatter};

/// A driver-native update: an ordered list of field modifications applied to
/// every matched document.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::driver::UpdateDefinition;
///
/// let update = UpdateDefinition::new()
///     .set("status", "shipped")
///     .inc("version", 1)
///     .unset("draft_note");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateDefinition {
    operations: Vec<UpdateOperation>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOperation {
    /// Sets a field to a value
    Set(String, Value),
    /// Removes a field
    Unset(String),
    /// Adds a number to a numeric field, treating a missing field as zero
    Inc(String, Number),
    /// Appends a value to an array field, creating the array if missing
    Push(String, Value),
}

impl UpdateDefinition {
    pub fn new() -> Self {
        UpdateDefinition::default()
    }

    pub fn set<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.operations
            .push(UpdateOperation::Set(field.to_string(), value.into()));
        self
    }

    pub fn unset(mut self, field: &str) -> Self {
        self.operations.push(UpdateOperation::Unset(field.to_string()));
        self
    }

    pub fn inc<T: Into<Number>>(mut self, field: &str, amount: T) -> Self {
        self.operations
            .push(UpdateOperation::Inc(field.to_string(), amount.into()));
        self
    }

    pub fn push<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.operations
            .push(UpdateOperation::Push(field.to_string(), value.into()));
        self
    }

    pub fn operations(&self) -> &[UpdateOperation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Applies every operation in order to `document`.
    ///
    /// The document key is immutable; any operation touching it fails with
    /// `UpdateError` and leaves the document unchanged.
    pub fn apply(&self, document: &mut RawDocument) -> RepositoryResult<()> {
        if let Some(operation) = self.operations.iter().find(|op| op.field() == DOC_ID) {
            log::error!("Update operation {:?} targets the immutable key field", operation);
            return Err(RepositoryError::new(
                &format!("Field '{}' is immutable and cannot be updated", DOC_ID),
                ErrorKind::UpdateError,
            ));
        }

        let mut updated = document.clone();
        for operation in &self.operations {
            operation.apply(&mut updated)?;
        }
        *document = updated;
        Ok(())
    }
}

impl UpdateOperation {
    fn field(&self) -> &str {
        match self {
            UpdateOperation::Set(field, _)
            | UpdateOperation::Unset(field)
            | UpdateOperation::Inc(field, _)
            | UpdateOperation::Push(field, _) => field,
        }
    }

    fn apply(&self, document: &mut RawDocument) -> RepositoryResult<()> {
        match self {
            UpdateOperation::Set(field, value) => set_field(document, field, value.clone()),
            UpdateOperation::Unset(field) => {
                remove_field(document, field);
                Ok(())
            }
            UpdateOperation::Inc(field, amount) => {
                let current = field_value(document, field).cloned().unwrap_or(Value::Null);
                let next = increment(field, &current, amount)?;
                set_field(document, field, next)
            }
            UpdateOperation::Push(field, value) => {
                match field_value(document, field).cloned() {
                    None | Some(Value::Null) => {
                        set_field(document, field, Value::Array(vec![value.clone()]))
                    }
                    Some(Value::Array(mut items)) => {
                        items.push(value.clone());
                        set_field(document, field, Value::Array(items))
                    }
                    Some(other) => {
                        log::error!("Cannot push into non-array field {} = {}", field, other);
                        Err(RepositoryError::new(
                            &format!("Cannot push into field '{}': it is not an array", field),
                            ErrorKind::UpdateError,
                        ))
                    }
                }
            }
        }
    }
}

fn increment(field: &str, current: &Value, amount: &Number) -> RepositoryResult<Value> {
    let current = match current {
        Value::Null => Number::from(0),
        Value::Number(number) => number.clone(),
        other => {
            log::error!("Cannot increment non-numeric field {} = {}", field, other);
            return Err(RepositoryError::new(
                &format!("Cannot increment field '{}': it is not a number", field),
                ErrorKind::UpdateError,
            ));
        }
    };

    if let (Some(left), Some(right)) = (current.as_i64(), amount.as_i64()) {
        if let Some(sum) = left.checked_add(right) {
            return Ok(Value::from(sum));
        }
    }

    let sum = current.as_f64().unwrap_or_default() + amount.as_f64().unwrap_or_default();
    Number::from_f64(sum).map(Value::Number).ok_or_else(|| {
        log::error!("Increment of field {} produced a non-finite number", field);
        RepositoryError::new(
            &format!("Increment of field '{}' produced a non-finite number", field),
            ErrorKind::UpdateError,
        )
    })
}

impl Display for UpdateDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.operations)
    }
}
