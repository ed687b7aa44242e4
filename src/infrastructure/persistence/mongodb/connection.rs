//! MongoDB connection management
//!
//! Provides connection pooling and timeout configuration for MongoDB operations.
//! The `MongoConnection` wrapper holds a reference to the database and creates
//! the indexes the group store relies on.

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use std::sync::Arc;
use std::time::Duration;

/// Connection timeout for MongoDB operations.
/// Applies to both initial connection and server selection.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(3);

pub const GROUPS: &str = "groups";
pub const MEMBERSHIPS: &str = "memberships";
pub const GROUP_REMINDERS: &str = "group_reminders";
pub const PROFILES: &str = "profiles";

/// MongoDB connection wrapper.
/// Holds the database reference for collection operations.
pub struct MongoConnection {
    database: Database,
}

impl MongoConnection {
    /// Create a new MongoDB connection with timeout configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The URI is invalid
    /// - Connection cannot be established within timeout
    /// - Database ping fails
    pub async fn new(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = Self::create_client_options(uri).await?;
        let client = Client::with_options(options)?;
        let database = client.database(db_name);

        // Ping to verify connection is actually working
        database.run_command(doc! { "ping": 1 }).await?;

        tracing::info!("Connected to MongoDB: {}", db_name);

        Ok(Self { database })
    }

    /// Get a typed collection from the database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> mongodb::Collection<T> {
        self.database.collection(name)
    }

    /// One membership per (group, account) and fast lookups by account.
    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let memberships = self.database.collection::<mongodb::bson::Document>(MEMBERSHIPS);
        memberships
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "group_id": 1, "user_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        memberships
            .create_index(IndexModel::builder().keys(doc! { "user_id": 1 }).build())
            .await?;

        self.database
            .collection::<mongodb::bson::Document>(GROUP_REMINDERS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "group_id": 1, "time": 1 })
                    .build(),
            )
            .await?;

        tracing::debug!("MongoDB indexes ensured");
        Ok(())
    }

    /// Create client options with timeout configuration.
    async fn create_client_options(uri: &str) -> anyhow::Result<ClientOptions> {
        let mut options = ClientOptions::parse(uri).await?;
        options.connect_timeout = Some(CONNECTION_TIMEOUT);
        options.server_selection_timeout = Some(CONNECTION_TIMEOUT);
        Ok(options)
    }
}

/// Initialize MongoDB connection and return a shared reference.
pub async fn init_mongodb(uri: &str, db_name: &str) -> anyhow::Result<Arc<MongoConnection>> {
    let conn = MongoConnection::new(uri, db_name).await?;
    conn.ensure_indexes().await?;
    Ok(Arc::new(conn))
}
