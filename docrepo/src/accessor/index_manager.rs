use super::ensure_open;
use crate::collection::CollectionResolver;
use crate::document::{Document, DocumentKey};
use crate::driver::{IndexDefinition, IndexOptions};
use crate::errors::RepositoryResult;

/// Index management capability. Indexes belong to one physical collection,
/// so each partition is indexed separately.
///
/// Every `create_*` method returns the index name, which is either the name
/// given in the options or the conventional one (`total_1`, `notes_text`).
#[derive(Debug)]
pub struct IndexAccessor {
    resolver: CollectionResolver,
}

impl IndexAccessor {
    pub fn new(resolver: CollectionResolver) -> RepositoryResult<Self> {
        ensure_open(&resolver, "index")?;
        Ok(IndexAccessor { resolver })
    }

    /// Lists the index names of a collection, the implicit key index first.
    pub fn get_index_names<D, K>(&self, partition: Option<&str>) -> RepositoryResult<Vec<String>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let indexes = self.resolver.resolve::<D, K>(partition)?.list_indexes()?;
        Ok(indexes
            .iter()
            .map(|index| index.name().to_string())
            .collect())
    }

    pub fn create_index<D, K>(
        &self,
        definition: &IndexDefinition,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolver
            .resolve::<D, K>(partition)?
            .create_index(definition, options)
    }

    pub fn create_text_index<D, K>(
        &self,
        field_name: &str,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.create_index::<D, K>(&IndexDefinition::text(field_name), options, partition)
    }

    pub fn create_ascending_index<D, K>(
        &self,
        field_name: &str,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.create_index::<D, K>(&IndexDefinition::ascending(field_name), options, partition)
    }

    pub fn create_descending_index<D, K>(
        &self,
        field_name: &str,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.create_index::<D, K>(&IndexDefinition::descending(field_name), options, partition)
    }

    pub fn create_hashed_index<D, K>(
        &self,
        field_name: &str,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.create_index::<D, K>(&IndexDefinition::hashed(field_name), options, partition)
    }

    /// Creates one text index over several fields.
    pub fn create_combined_text_index<D, K>(
        &self,
        field_names: &[&str],
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.create_index::<D, K>(
            &IndexDefinition::combined_text(field_names),
            options,
            partition,
        )
    }

    pub fn drop_index<D, K>(&self, index_name: &str, partition: Option<&str>) -> RepositoryResult<()>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolver
            .resolve::<D, K>(partition)?
            .drop_index(index_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::InMemoryDatabase;
    use crate::driver::{non_unique_index, unique_index, Database};
    use crate::errors::ErrorKind;
    use crate::repository_config::RepositoryConfig;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Clone, Serialize, Deserialize)]
    struct Article {
        id: Uuid,
        title: String,
        body: String,
    }

    impl Document for Article {
        fn id(&self) -> &Uuid {
            &self.id
        }

        fn set_id(&mut self, id: Uuid) {
            self.id = id;
        }
    }

    fn index_manager() -> IndexAccessor {
        let config = RepositoryConfig::new();
        config
            .set_database(Database::new(InMemoryDatabase::new("cms")))
            .unwrap();
        IndexAccessor::new(CollectionResolver::new(config)).unwrap()
    }

    #[test]
    fn test_create_each_kind() {
        let manager = index_manager();
        let options = non_unique_index();
        assert_eq!(
            manager
                .create_text_index::<Article, Uuid>("body", &options, None)
                .unwrap(),
            "body_text"
        );
        assert_eq!(
            manager
                .create_ascending_index::<Article, Uuid>("title", &options, None)
                .unwrap(),
            "title_1"
        );
        assert_eq!(
            manager
                .create_descending_index::<Article, Uuid>("title", &options.clone().name("title_desc"), None)
                .unwrap(),
            "title_desc"
        );
        assert_eq!(
            manager
                .create_hashed_index::<Article, Uuid>("id", &options, None)
                .unwrap(),
            "id_hashed"
        );
        assert_eq!(
            manager
                .create_combined_text_index::<Article, Uuid>(&["title", "body"], &options, None)
                .unwrap(),
            "title_text_body_text"
        );

        let names = manager.get_index_names::<Article, Uuid>(None).unwrap();
        assert_eq!(
            names,
            vec![
                "_id_",
                "body_text",
                "title_1",
                "title_desc",
                "id_hashed",
                "title_text_body_text"
            ]
        );
    }

    #[test]
    fn test_indexes_are_per_partition() {
        let manager = index_manager();
        manager
            .create_ascending_index::<Article, Uuid>("title", &unique_index(), Some("en"))
            .unwrap();
        assert_eq!(
            manager.get_index_names::<Article, Uuid>(Some("fr")).unwrap(),
            vec!["_id_"]
        );
        assert_eq!(
            manager.get_index_names::<Article, Uuid>(Some("en")).unwrap(),
            vec!["_id_", "title_1"]
        );
    }

    #[test]
    fn test_drop_index() {
        let manager = index_manager();
        manager
            .create_ascending_index::<Article, Uuid>("title", &non_unique_index(), None)
            .unwrap();
        manager.drop_index::<Article, Uuid>("title_1", None).unwrap();
        let error = manager
            .drop_index::<Article, Uuid>("title_1", None)
            .unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::IndexNotFound);
    }
}
