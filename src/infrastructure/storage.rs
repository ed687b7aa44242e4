//! Storage backend selection.

use std::sync::Arc;

use super::config::{StorageSettings, StorageType};
use super::persistence;
use crate::domain::repository::{AccountDirectory, GroupStore, ProfileRegistry};

/// The store, its account directory and (for self-hosted stores) the
/// profile writer, all backed by the same storage.
pub struct StorageBackend {
    pub store: Arc<dyn GroupStore>,
    pub directory: Arc<dyn AccountDirectory>,
    pub profiles: Option<Arc<dyn ProfileRegistry>>,
}

/// Initialize storage based on configuration
pub async fn init_storage(settings: &StorageSettings) -> anyhow::Result<StorageBackend> {
    match settings.storage_type {
        StorageType::Sqlite => {
            tracing::info!("Using SQLite storage backend");
            let db = persistence::sqlite::init_database(&settings.sqlite.effective_path())?;
            let store = Arc::new(persistence::sqlite::SqliteStore::new(db));

            Ok(StorageBackend {
                store: store.clone(),
                directory: store.clone(),
                profiles: Some(store),
            })
        }
        StorageType::Rest => {
            tracing::info!("Using REST storage backend at {}", settings.rest.base_url);
            let store = Arc::new(persistence::rest::RestStore::new(&settings.rest)?);

            Ok(StorageBackend {
                store: store.clone(),
                directory: store,
                profiles: None,
            })
        }
        StorageType::Mongodb => {
            tracing::info!("Using MongoDB storage backend");
            let mongo = &settings.mongodb;
            let conn = persistence::mongodb::init_mongodb(&mongo.uri, &mongo.database).await?;
            let store = Arc::new(persistence::mongodb::MongoStore::new(conn));

            Ok(StorageBackend {
                store: store.clone(),
                directory: store.clone(),
                profiles: Some(store),
            })
        }
        StorageType::Memory => {
            tracing::info!("Using in-memory storage backend");
            let store = Arc::new(persistence::memory::MemoryStore::new());

            Ok(StorageBackend {
                store: store.clone(),
                directory: store.clone(),
                profiles: Some(store),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AccountProfile;
    use crate::infrastructure::config::RestSettings;

    #[tokio::test]
    async fn test_memory_backend_shares_one_store() {
        let settings = StorageSettings {
            storage_type: StorageType::Memory,
            ..Default::default()
        };
        let backend = init_storage(&settings).await.unwrap();

        let profiles = backend.profiles.expect("memory store registers profiles");
        profiles
            .save_profile(&AccountProfile::new("u1", "ann@x.com", None))
            .await
            .unwrap();

        let found = backend.directory.search_accounts("ann", 10).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_rest_backend_requires_base_url() {
        let settings = StorageSettings {
            storage_type: StorageType::Rest,
            rest: RestSettings::default(),
            ..Default::default()
        };
        assert!(init_storage(&settings).await.is_err());
    }

    #[tokio::test]
    async fn test_sqlite_backend_creates_file() {
        let dir = std::env::temp_dir().join(format!("remindly-db-{}", ulid::Ulid::new()));
        let mut settings = StorageSettings::default();
        settings.sqlite.path = dir.join("data.db").to_string_lossy().into_owned();

        let backend = init_storage(&settings).await.unwrap();
        assert!(backend.profiles.is_some());
        assert!(dir.join("data.db").exists());

        drop(backend);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
