use std::{
    fmt,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use mongodb::{
    bson::{doc, Bson, DateTime as BsonDateTime, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use super::{EntryId, NewEntry, StoreError, StoreResult, WaitlistStore};
use crate::config::{StoreConfig, STORE_URI_ENV};

/// Applies to server selection and to establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_IDLE_TIME: Duration = Duration::from_secs(10);

/// A MongoDB-backed store.
///
/// The client is created on the first insert and cached for the lifetime of the process.
/// A cached client is pinged before every reuse and replaced if the ping fails, so a dropped
/// connection costs one reconnect instead of a failed request.
#[derive(Debug)]
pub struct MongoStore {
    uri: Option<SecretString>,
    database: String,
    collection: String,
    clients: ClientCache<MongoConnector>,
}

impl MongoStore {
    pub fn new(config: &StoreConfig) -> Self {
        MongoStore {
            uri: config.uri.clone(),
            database: config.database.clone(),
            collection: config.collection.clone(),
            clients: ClientCache::new(MongoConnector),
        }
    }

    async fn client(&self) -> StoreResult<Client> {
        let uri = self
            .uri
            .as_ref()
            .map(|uri| uri.expose_secret())
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| {
                StoreError::StoreUnavailable(format!("{STORE_URI_ENV} is not set"))
            })?;

        self.clients.get(uri).await
    }
}

#[async_trait]
impl WaitlistStore for MongoStore {
    #[tracing::instrument(name = "Inserting waitlist entry into MongoDB", skip_all)]
    async fn insert(&self, entry: NewEntry) -> StoreResult<EntryId> {
        let client = self.client().await?;
        let collection = client
            .database(&self.database)
            .collection::<Document>(&self.collection);

        let document = doc! {
            "email": entry.email.as_ref(),
            "joinedAt": BsonDateTime::from_millis(entry.joined_at.timestamp_millis()),
        };

        let result = collection
            .insert_one(document)
            .await
            .map_err(|er| StoreError::WriteFailed(er.to_string()))?;

        let id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };

        Ok(EntryId::new(id))
    }
}

// ###################################
// ->   CLIENT CACHE
// ###################################
/// Opens and health-checks connections for `ClientCache`.
#[async_trait]
trait Connector: Send + Sync {
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self, uri: &str) -> StoreResult<Self::Handle>;
    async fn ping(&self, handle: &Self::Handle) -> StoreResult<()>;
}

/// Holds at most one live handle.
///
/// The slot lock only guards reading and swapping the handle. Pings and connects run
/// without it, so concurrent callers never wait on each other's network round trips.
struct ClientCache<C: Connector> {
    connector: C,
    slot: Mutex<Slot<C::Handle>>,
}

struct Slot<H> {
    /// Bumped on every install so a failed ping only evicts the handle it pinged.
    generation: u64,
    handle: Option<H>,
}

impl<C: Connector> ClientCache<C> {
    fn new(connector: C) -> Self {
        ClientCache {
            connector,
            slot: Mutex::new(Slot {
                generation: 0,
                handle: None,
            }),
        }
    }

    /// Returns a healthy handle, connecting if there is none cached or the cached one is stale.
    async fn get(&self, uri: &str) -> StoreResult<C::Handle> {
        if let Some((generation, handle)) = self.cached() {
            match self.connector.ping(&handle).await {
                Ok(()) => {
                    debug!("{:<20} - Using cached MongoDB client", "mongo_store");
                    return Ok(handle);
                }
                Err(er) => {
                    warn!(error = %er, "cached MongoDB client failed the health check");
                    self.evict(generation);
                }
            }
        }

        let handle = self.connector.connect(uri).await?;
        self.install(handle.clone());

        Ok(handle)
    }

    fn cached(&self) -> Option<(u64, C::Handle)> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.handle.clone().map(|handle| (slot.generation, handle))
    }

    fn evict(&self, generation: u64) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.generation == generation {
            slot.handle = None;
        }
    }

    fn install(&self, handle: C::Handle) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        slot.handle = Some(handle);
    }
}

impl<C: Connector + fmt::Debug> fmt::Debug for ClientCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCache")
            .field("connector", &self.connector)
            .field("cached", &self.cached().is_some())
            .finish()
    }
}

#[derive(Debug)]
struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    type Handle = Client;

    async fn connect(&self, uri: &str) -> StoreResult<Client> {
        info!("{:<20} - Creating a new MongoDB client", "mongo_store");

        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|er| StoreError::StoreUnavailable(er.to_string()))?;
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );
        // One connection per process instance is enough for a single insert per request.
        options.max_pool_size = Some(1);
        options.min_pool_size = Some(0);
        options.max_idle_time = Some(MAX_IDLE_TIME);
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);
        options.connect_timeout = Some(CONNECT_TIMEOUT);

        let client = Client::with_options(options)
            .map_err(|er| StoreError::StoreUnavailable(er.to_string()))?;

        // The driver connects lazily, the ping makes connection problems surface here.
        self.ping(&client).await?;
        info!("{:<20} - MongoDB connected", "mongo_store");

        Ok(client)
    }

    async fn ping(&self, client: &Client) -> StoreResult<()> {
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|er| StoreError::StoreUnavailable(er.to_string()))?;
        Ok(())
    }
}
