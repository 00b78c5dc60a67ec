use crate::common::DOC_ID;
use crate::driver::value::{compare_values, field_value, RawDocument};
use crate::errors::RepositoryResult;
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Evaluates a filter condition against a raw document.
///
/// Drivers call `apply` for every candidate document. Custom conditions can
/// be plugged in by implementing this trait and wrapping it in a [`Filter`].
pub trait FilterProvider: Send + Sync + Display {
    fn apply(&self, document: &RawDocument) -> RepositoryResult<bool>;
}

/// A driver-native filter. Cheap to clone.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::driver::{all, field};
///
/// let open_orders = field("status").eq("open").and(field("total").gte(100));
/// let everything = all();
/// ```
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter {
            inner: Arc::new(inner),
        }
    }

    /// Matches documents accepted by both filters.
    pub fn and(self, other: Filter) -> Filter {
        and(vec![self, other])
    }

    /// Matches documents accepted by either filter.
    pub fn or(self, other: Filter) -> Filter {
        or(vec![self, other])
    }

    /// Matches documents rejected by this filter.
    pub fn not(self) -> Filter {
        Filter::new(NotFilter { filter: self })
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter({})", self.inner)
    }
}

/// Matches every document.
pub fn all() -> Filter {
    Filter::new(AllFilter)
}

/// Matches documents accepted by every filter in the list.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter { filters })
}

/// Matches documents accepted by at least one filter in the list.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter { filters })
}

/// Matches the document stored under `id`.
pub fn by_id<K: Serialize>(id: &K) -> RepositoryResult<Filter> {
    let value = serde_json::to_value(id)?;
    Ok(field(DOC_ID).eq(value))
}

/// Starts a fluent condition on a (possibly nested) field.
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value, ComparisonMode::Equal)
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value, ComparisonMode::NotEqual)
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value, ComparisonMode::Greater)
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value, ComparisonMode::GreaterEqual)
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value, ComparisonMode::Lesser)
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value, ComparisonMode::LesserEqual)
    }

    /// Matches documents whose field equals one of the given values.
    pub fn in_list<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        Filter::new(InFilter {
            field_name: self.field_name,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Matches documents where the field is present (`true`) or absent (`false`).
    pub fn exists(self, present: bool) -> Filter {
        Filter::new(ExistsFilter {
            field_name: self.field_name,
            present,
        })
    }

    fn compare<T: Into<Value>>(self, value: T, mode: ComparisonMode) -> Filter {
        Filter::new(ComparisonFilter {
            field_name: self.field_name,
            value: value.into(),
            mode,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComparisonMode {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl ComparisonMode {
    fn symbol(&self) -> &'static str {
        match self {
            ComparisonMode::Equal => "==",
            ComparisonMode::NotEqual => "!=",
            ComparisonMode::Greater => ">",
            ComparisonMode::GreaterEqual => ">=",
            ComparisonMode::Lesser => "<",
            ComparisonMode::LesserEqual => "<=",
        }
    }
}

struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _document: &RawDocument) -> RepositoryResult<bool> {
        Ok(true)
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "All")
    }
}

struct ComparisonFilter {
    field_name: String,
    value: Value,
    mode: ComparisonMode,
}

impl FilterProvider for ComparisonFilter {
    fn apply(&self, document: &RawDocument) -> RepositoryResult<bool> {
        let actual = field_value(document, &self.field_name).unwrap_or(&Value::Null);
        let matched = match self.mode {
            ComparisonMode::Equal => values_equal(actual, &self.value),
            ComparisonMode::NotEqual => !values_equal(actual, &self.value),
            ComparisonMode::Greater => {
                compare_values(actual, &self.value) == Some(Ordering::Greater)
            }
            ComparisonMode::GreaterEqual => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            ComparisonMode::Lesser => compare_values(actual, &self.value) == Some(Ordering::Less),
            ComparisonMode::LesserEqual => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        };
        Ok(matched)
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field_name, self.mode.symbol(), self.value)
    }
}

struct InFilter {
    field_name: String,
    values: Vec<Value>,
}

impl FilterProvider for InFilter {
    fn apply(&self, document: &RawDocument) -> RepositoryResult<bool> {
        let actual = field_value(document, &self.field_name).unwrap_or(&Value::Null);
        Ok(self.values.iter().any(|value| values_equal(actual, value)))
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in [{}])", self.field_name, self.values.iter().join(", "))
    }
}

struct ExistsFilter {
    field_name: String,
    present: bool,
}

impl FilterProvider for ExistsFilter {
    fn apply(&self, document: &RawDocument) -> RepositoryResult<bool> {
        Ok(field_value(document, &self.field_name).is_some() == self.present)
    }
}

impl Display for ExistsFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} exists {})", self.field_name, self.present)
    }
}

struct AndFilter {
    filters: Vec<Filter>,
}

impl FilterProvider for AndFilter {
    fn apply(&self, document: &RawDocument) -> RepositoryResult<bool> {
        for filter in &self.filters {
            if !filter.apply(document)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.filters.iter().join(" && "))
    }
}

struct OrFilter {
    filters: Vec<Filter>,
}

impl FilterProvider for OrFilter {
    fn apply(&self, document: &RawDocument) -> RepositoryResult<bool> {
        for filter in &self.filters {
            if filter.apply(document)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.filters.iter().join(" || "))
    }
}

struct NotFilter {
    filter: Filter,
}

impl FilterProvider for NotFilter {
    fn apply(&self, document: &RawDocument) -> RepositoryResult<bool> {
        Ok(!self.filter.apply(document)?)
    }
}

impl Display for NotFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "!{}", self.filter)
    }
}

// numbers compare by value so that 1 and 1.0 are equal
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => {
            compare_values(left, right) == Some(Ordering::Equal)
        }
        _ => left == right,
    }
}
