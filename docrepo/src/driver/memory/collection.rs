use super::InMemoryDatabase;
use crate::common::{LockHandle, DOC_ID, ID_INDEX_NAME};
use crate::driver::value::field_value;
use crate::driver::{
    CollectionProvider, DatabaseProvider, Filter, FindOptions, IndexDefinition, IndexDescriptor, IndexOptions,
    RawDocument, UpdateDefinition, WriteResult,
};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use crossbeam_skiplist::SkipMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A handle to one named collection of an [`InMemoryDatabase`].
///
/// The handle is bound to a name, not to storage. Reads against a name that
/// has never been written see an empty collection and leave the catalog
/// untouched; the first insert, upsert or index creation registers the
/// collection. A handle that outlives `drop_collection` sees the collection
/// empty again and recreates it on its next write.
#[derive(Clone)]
pub struct InMemoryCollection {
    name: String,
    database: InMemoryDatabase,
}

impl InMemoryCollection {
    pub(crate) fn new(name: &str, database: InMemoryDatabase) -> Self {
        InMemoryCollection {
            name: name.to_string(),
            database,
        }
    }

    // Registered storage, or an empty unregistered stand-in.
    fn view(&self) -> RepositoryResult<Arc<CollectionStore>> {
        match self.database.existing_store(&self.name)? {
            Some(store) => Ok(store),
            None => Ok(self.database.empty_store(&self.name)),
        }
    }

    fn materialize(&self) -> RepositoryResult<Arc<CollectionStore>> {
        self.database.materialize_store(&self.name)
    }
}

impl CollectionProvider for InMemoryCollection {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn database_name(&self) -> String {
        self.database.name()
    }

    fn insert_one(&self, document: RawDocument) -> RepositoryResult<WriteResult> {
        self.materialize()?.insert(vec![document])
    }

    fn insert_many(&self, documents: Vec<RawDocument>) -> RepositoryResult<WriteResult> {
        if documents.is_empty() {
            return self.view()?.insert(documents);
        }
        self.materialize()?.insert(documents)
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> RepositoryResult<Vec<RawDocument>> {
        self.view()?.find(filter, options)
    }

    fn count(&self, filter: &Filter) -> RepositoryResult<u64> {
        self.view()?.count(filter)
    }

    fn replace_one(
        &self,
        filter: &Filter,
        replacement: RawDocument,
        upsert: bool,
    ) -> RepositoryResult<WriteResult> {
        let store = if upsert {
            self.materialize()?
        } else {
            self.view()?
        };
        store.replace_one(filter, replacement, upsert)
    }

    fn update(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
        just_once: bool,
    ) -> RepositoryResult<WriteResult> {
        self.view()?.update(filter, update, just_once)
    }

    fn delete(&self, filter: &Filter, just_once: bool) -> RepositoryResult<WriteResult> {
        self.view()?.delete(filter, just_once)
    }

    fn create_index(
        &self,
        definition: &IndexDefinition,
        options: &IndexOptions,
    ) -> RepositoryResult<String> {
        self.materialize()?.create_index(definition, options)
    }

    fn list_indexes(&self) -> RepositoryResult<Vec<IndexDescriptor>> {
        self.view()?.list_indexes()
    }

    fn drop_index(&self, name: &str) -> RepositoryResult<()> {
        self.view()?.drop_index(name)
    }
}

/// Storage of one registered collection.
///
/// Documents live in a skip list keyed by insertion sequence, so scans return
/// them in insertion order. Writers take the collection's write lock, which
/// makes each write (unique checks included) atomic; readers take the read
/// lock and never observe a half-applied batch.
pub(crate) struct CollectionStore {
    name: String,
    database_name: String,
    documents: SkipMap<u64, RawDocument>,
    sequence: AtomicU64,
    indexes: RwLock<Vec<IndexDescriptor>>,
    lock: LockHandle,
    database_closed: Arc<AtomicBool>,
    dropped: AtomicBool,
}

impl CollectionStore {
    pub(crate) fn new(
        name: &str,
        database_name: &str,
        lock: LockHandle,
        database_closed: Arc<AtomicBool>,
    ) -> Self {
        CollectionStore {
            name: name.to_string(),
            database_name: database_name.to_string(),
            documents: SkipMap::new(),
            sequence: AtomicU64::new(0),
            indexes: RwLock::new(Vec::new()),
            lock,
            database_closed,
            dropped: AtomicBool::new(false),
        }
    }

    pub(crate) fn mark_dropped(&self) {
        let _guard = self.lock.write();
        self.documents.clear();
        self.dropped.store(true, Ordering::Relaxed);
    }

    fn check_opened(&self) -> RepositoryResult<()> {
        if self.database_closed.load(Ordering::Relaxed) {
            log::error!("Database {} is closed", self.database_name);
            return Err(RepositoryError::new(
                &format!("Database {} is closed", self.database_name),
                ErrorKind::StoreAlreadyClosed,
            ));
        }

        if self.dropped.load(Ordering::Relaxed) {
            log::error!("Collection {} has been dropped", self.name);
            return Err(RepositoryError::new(
                &format!("Collection {} has been dropped", self.name),
                ErrorKind::CollectionNotFound,
            ));
        }
        Ok(())
    }

    fn insert(&self, documents: Vec<RawDocument>) -> RepositoryResult<WriteResult> {
        let _guard = self.lock.write();
        self.check_opened()?;

        for document in &documents {
            check_has_id(document)?;
        }
        self.check_unique(&HashMap::new(), &documents)?;

        let count = documents.len() as u64;
        for document in documents {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
            self.documents.insert(sequence, document);
        }
        Ok(WriteResult::inserted(count))
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> RepositoryResult<Vec<RawDocument>> {
        let _guard = self.lock.read();
        self.check_opened()?;

        let mut matches = Vec::new();
        for entry in self.documents.iter() {
            if filter.apply(entry.value())? {
                matches.push(entry.value().clone());
            }
        }
        Ok(options.apply(matches))
    }

    fn count(&self, filter: &Filter) -> RepositoryResult<u64> {
        let _guard = self.lock.read();
        self.check_opened()?;

        let mut count = 0;
        for entry in self.documents.iter() {
            if filter.apply(entry.value())? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn replace_one(
        &self,
        filter: &Filter,
        mut replacement: RawDocument,
        upsert: bool,
    ) -> RepositoryResult<WriteResult> {
        let _guard = self.lock.write();
        self.check_opened()?;

        let mut target = None;
        for entry in self.documents.iter() {
            if filter.apply(entry.value())? {
                target = Some((*entry.key(), entry.value().clone()));
                break;
            }
        }

        match target {
            Some((sequence, existing)) => {
                let existing_id = existing.get(DOC_ID).cloned().unwrap_or(Value::Null);
                match replacement.get(DOC_ID) {
                    None => {
                        replacement.insert(DOC_ID.to_string(), existing_id);
                    }
                    Some(id) if *id == existing_id => {}
                    Some(id) => {
                        log::error!(
                            "Replacement in {} would change {} from {} to {}",
                            self.name,
                            DOC_ID,
                            existing_id,
                            id
                        );
                        return Err(RepositoryError::new(
                            &format!("Field '{}' is immutable and cannot be replaced", DOC_ID),
                            ErrorKind::UpdateError,
                        ));
                    }
                }

                if replacement == existing {
                    return Ok(WriteResult::updated(1, 0));
                }

                let replacements = HashMap::from([(sequence, &replacement)]);
                self.check_unique(&replacements, &[])?;
                self.documents.insert(sequence, replacement);
                Ok(WriteResult::updated(1, 1))
            }
            None if upsert => {
                check_has_id(&replacement)?;
                self.check_unique(&HashMap::new(), std::slice::from_ref(&replacement))?;
                let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
                self.documents.insert(sequence, replacement);
                Ok(WriteResult::upserted())
            }
            None => Ok(WriteResult::default()),
        }
    }

    fn update(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
        just_once: bool,
    ) -> RepositoryResult<WriteResult> {
        let _guard = self.lock.write();
        self.check_opened()?;

        let mut matched = 0;
        let mut changed = Vec::new();
        for entry in self.documents.iter() {
            if filter.apply(entry.value())? {
                matched += 1;
                let mut updated = entry.value().clone();
                update.apply(&mut updated)?;
                if &updated != entry.value() {
                    changed.push((*entry.key(), updated));
                }
                if just_once {
                    break;
                }
            }
        }

        let replacements = changed
            .iter()
            .map(|(sequence, document)| (*sequence, document))
            .collect::<HashMap<_, _>>();
        self.check_unique(&replacements, &[])?;

        let modified = changed.len() as u64;
        for (sequence, document) in changed {
            self.documents.insert(sequence, document);
        }
        Ok(WriteResult::updated(matched, modified))
    }

    fn delete(&self, filter: &Filter, just_once: bool) -> RepositoryResult<WriteResult> {
        let _guard = self.lock.write();
        self.check_opened()?;

        let mut doomed = Vec::new();
        for entry in self.documents.iter() {
            if filter.apply(entry.value())? {
                doomed.push(*entry.key());
                if just_once {
                    break;
                }
            }
        }

        for sequence in &doomed {
            self.documents.remove(sequence);
        }
        Ok(WriteResult::deleted(doomed.len() as u64))
    }

    fn create_index(
        &self,
        definition: &IndexDefinition,
        options: &IndexOptions,
    ) -> RepositoryResult<String> {
        let _guard = self.lock.write();
        self.check_opened()?;

        if definition.keys().is_empty() {
            log::error!("Cannot create an index without keys on {}", self.name);
            return Err(RepositoryError::new(
                "An index needs at least one key",
                ErrorKind::InvalidOperation,
            ));
        }

        let name = options
            .index_name()
            .map(str::to_string)
            .unwrap_or_else(|| definition.default_name());
        let descriptor = IndexDescriptor::new(&name, definition.clone(), options.is_unique());

        let mut indexes = self.indexes.write();
        if let Some(existing) = indexes
            .iter()
            .find(|index| index.name() == name || index.definition() == definition)
        {
            if *existing == descriptor {
                return Ok(name);
            }
            log::error!(
                "Index {} conflicts with existing index {} on {}",
                descriptor,
                existing,
                self.name
            );
            return Err(RepositoryError::new(
                &format!(
                    "Index {} conflicts with existing index {}",
                    name,
                    existing.name()
                ),
                ErrorKind::IndexAlreadyExists,
            ));
        }

        if name == ID_INDEX_NAME {
            log::error!("Index name {} is reserved", ID_INDEX_NAME);
            return Err(RepositoryError::new(
                &format!("Index name {} is reserved", ID_INDEX_NAME),
                ErrorKind::IndexAlreadyExists,
            ));
        }

        if descriptor.is_unique() {
            let documents = self.documents.iter().collect::<Vec<_>>();
            ensure_unique(&descriptor, documents.iter().map(|entry| entry.value()))?;
        }

        log::debug!("Created index {} on {}", descriptor, self.name);
        indexes.push(descriptor);
        Ok(name)
    }

    fn list_indexes(&self) -> RepositoryResult<Vec<IndexDescriptor>> {
        self.check_opened()?;

        let mut indexes = vec![IndexDescriptor::id_index()];
        indexes.extend(self.indexes.read().iter().cloned());
        Ok(indexes)
    }

    fn drop_index(&self, name: &str) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        self.check_opened()?;

        if name == ID_INDEX_NAME {
            log::error!("Cannot drop the {} index of {}", ID_INDEX_NAME, self.name);
            return Err(RepositoryError::new(
                &format!("Index {} cannot be dropped", ID_INDEX_NAME),
                ErrorKind::InvalidOperation,
            ));
        }

        let mut indexes = self.indexes.write();
        match indexes.iter().position(|index| index.name() == name) {
            Some(position) => {
                indexes.remove(position);
                Ok(())
            }
            None => {
                log::error!("Index {} not found on {}", name, self.name);
                Err(RepositoryError::new(
                    &format!("Index {} not found on {}", name, self.name),
                    ErrorKind::IndexNotFound,
                ))
            }
        }
    }

    // Validates every unique index against the collection as it would look
    // after swapping in `replacements` and appending `additions`.
    fn check_unique(
        &self,
        replacements: &HashMap<u64, &RawDocument>,
        additions: &[RawDocument],
    ) -> RepositoryResult<()> {
        let mut unique_indexes = vec![IndexDescriptor::id_index()];
        unique_indexes.extend(
            self.indexes
                .read()
                .iter()
                .filter(|index| index.is_unique())
                .cloned(),
        );

        let entries = self.documents.iter().collect::<Vec<_>>();
        let candidates = entries
            .iter()
            .map(|entry| match replacements.get(entry.key()) {
                Some(replacement) => *replacement,
                None => entry.value(),
            })
            .chain(additions.iter())
            .collect::<Vec<_>>();

        for index in &unique_indexes {
            ensure_unique(index, candidates.iter().copied())?;
        }
        Ok(())
    }
}

fn check_has_id(document: &RawDocument) -> RepositoryResult<()> {
    match document.get(DOC_ID) {
        None | Some(Value::Null) => {
            log::error!("Document without {} cannot be stored", DOC_ID);
            Err(RepositoryError::new(
                &format!("Document has no '{}' field", DOC_ID),
                ErrorKind::InvalidId,
            ))
        }
        Some(_) => Ok(()),
    }
}

fn ensure_unique<'a, I>(index: &IndexDescriptor, documents: I) -> RepositoryResult<()>
where
    I: Iterator<Item = &'a RawDocument>,
{
    let mut seen = HashSet::new();
    for document in documents {
        let key = index
            .definition()
            .keys()
            .iter()
            .map(|key| field_value(document, key.field()).cloned().unwrap_or(Value::Null))
            .collect::<Vec<_>>();
        let key = Value::Array(key).to_string();
        if !seen.insert(key.clone()) {
            log::error!("Duplicate key {} for unique index {}", key, index.name());
            return Err(RepositoryError::new(
                &format!("Duplicate key {} violates unique index {}", key, index.name()),
                ErrorKind::UniqueConstraintViolation,
            ));
        }
    }
    Ok(())
}
