use crate::common::{
    ASCENDING_INDEX, DESCENDING_INDEX, DOC_ID, HASHED_INDEX, ID_INDEX_NAME, INDEX_NAME_SEPARATOR,
    TEXT_INDEX,
};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// How a single field participates in an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Ascending,
    Descending,
    Text,
    Hashed,
}

impl IndexKind {
    /// The token used for this kind in generated index names
    /// (`total_1`, `total_-1`, `notes_text`, `sku_hashed`).
    pub fn token(&self) -> &'static str {
        match self {
            IndexKind::Ascending => ASCENDING_INDEX,
            IndexKind::Descending => DESCENDING_INDEX,
            IndexKind::Text => TEXT_INDEX,
            IndexKind::Hashed => HASHED_INDEX,
        }
    }
}

/// One indexed field and its kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexKey {
    field: String,
    kind: IndexKind,
}

impl IndexKey {
    pub fn new(field: &str, kind: IndexKind) -> Self {
        IndexKey {
            field: field.to_string(),
            kind,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }
}

/// The keys of an index, in significance order.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::driver::IndexDefinition;
///
/// let by_customer_then_date = IndexDefinition::ascending("customer_id")
///     .then_descending("created_at");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexDefinition {
    keys: Vec<IndexKey>,
}

impl IndexDefinition {
    pub fn new(keys: Vec<IndexKey>) -> Self {
        IndexDefinition { keys }
    }

    pub fn ascending(field: &str) -> Self {
        IndexDefinition::new(vec![IndexKey::new(field, IndexKind::Ascending)])
    }

    pub fn descending(field: &str) -> Self {
        IndexDefinition::new(vec![IndexKey::new(field, IndexKind::Descending)])
    }

    pub fn text(field: &str) -> Self {
        IndexDefinition::new(vec![IndexKey::new(field, IndexKind::Text)])
    }

    pub fn hashed(field: &str) -> Self {
        IndexDefinition::new(vec![IndexKey::new(field, IndexKind::Hashed)])
    }

    /// Builds a text index spanning several fields.
    pub fn combined_text(fields: &[&str]) -> Self {
        IndexDefinition::new(
            fields
                .iter()
                .map(|field| IndexKey::new(field, IndexKind::Text))
                .collect(),
        )
    }

    pub fn then_ascending(mut self, field: &str) -> Self {
        self.keys.push(IndexKey::new(field, IndexKind::Ascending));
        self
    }

    pub fn then_descending(mut self, field: &str) -> Self {
        self.keys.push(IndexKey::new(field, IndexKind::Descending));
        self
    }

    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    pub fn fields(&self) -> Vec<&str> {
        self.keys.iter().map(|key| key.field()).collect()
    }

    /// The conventional name of an index built from this definition.
    pub fn default_name(&self) -> String {
        self.keys
            .iter()
            .map(|key| format!("{}{}{}", key.field, INDEX_NAME_SEPARATOR, key.kind.token()))
            .join(INDEX_NAME_SEPARATOR)
    }
}

/// Creation options for an index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexOptions {
    unique: bool,
    name: Option<String>,
}

impl IndexOptions {
    pub fn new() -> Self {
        IndexOptions::default()
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn index_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Shorthand for `IndexOptions::new().unique(true)`.
pub fn unique_index() -> IndexOptions {
    IndexOptions::new().unique(true)
}

/// Shorthand for `IndexOptions::new()`.
pub fn non_unique_index() -> IndexOptions {
    IndexOptions::new()
}

/// An index as reported by a collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDescriptor {
    name: String,
    definition: IndexDefinition,
    unique: bool,
}

impl IndexDescriptor {
    pub fn new(name: &str, definition: IndexDefinition, unique: bool) -> Self {
        IndexDescriptor {
            name: name.to_string(),
            definition,
            unique,
        }
    }

    /// The implicit unique index on the document key every collection has.
    pub fn id_index() -> Self {
        IndexDescriptor::new(ID_INDEX_NAME, IndexDefinition::ascending(DOC_ID), true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &IndexDefinition {
        &self.definition
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

impl Display for IndexDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}]{}",
            self.name,
            self.definition.default_name(),
            if self.unique { " unique" } else { "" }
        )
    }
}
