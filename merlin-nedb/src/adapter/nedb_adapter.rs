use crate::adapter::{
    AdapterBuilder, AdapterConfig, CollectionRegistry, ConnectionState, OrmOptions,
};
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::datastore::{Datastore, DatastoreFactory};
use crate::errors::{AdapterError, AdapterResult, ErrorKind};
use crate::orm::Orm;
use std::sync::Arc;

/// Storage adapter connecting the ORM to one embedded datastore per
/// collection.
///
/// `NedbAdapter` is cheap to clone; clones share the registry and the
/// connection state.
///
/// # Lifecycle
/// ```text
/// Disconnected --connect--> Connecting --loaded--> Connected --close--> Disconnected
///                               \--load failed--> Disconnected
/// ```
///
/// # Examples
///
/// ```rust,ignore
/// let orm = Orm::new().model("Test", "tests");
/// let adapter = NedbAdapter::with_config()
///     .database_path("/var/lib/app")
///     .build(&orm)?;
///
/// adapter.connect(|result| assert!(result.is_ok()));
/// adapter.find("tests", &OperationOptions::new(), &query, RecordCollector::new())?;
/// ```
#[derive(Clone)]
pub struct NedbAdapter {
    pub(crate) inner: Arc<AdapterInner>,
}

impl NedbAdapter {
    /// An adapter for the models of `orm`, using the in-memory datastore
    /// unless `config` names a database path.
    pub fn new(orm: &Orm, config: AdapterConfig) -> Self {
        NedbAdapter::with_factory(orm, config, DatastoreFactory::default())
    }

    pub fn with_config() -> AdapterBuilder {
        AdapterBuilder::new()
    }

    pub(crate) fn with_factory(orm: &Orm, config: AdapterConfig, factory: DatastoreFactory) -> Self {
        NedbAdapter {
            inner: Arc::new(AdapterInner {
                collection_names: orm.collection_names(),
                config,
                factory,
                options: OrmOptions::default(),
                registry: CollectionRegistry::new(),
                connection: atomic(Connection::default()),
            }),
        }
    }

    /// The naming conventions the ORM has to merge into its options.
    pub fn options(&self) -> &OrmOptions {
        &self.inner.options
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.inner.config
    }

    /// Collections opened on connect, one per distinct model collection.
    pub fn collection_names(&self) -> &[String] {
        &self.inner.collection_names
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.inner.registry
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// The datastore registered for `name`.
    pub fn collection(&self, name: &str) -> AdapterResult<Datastore> {
        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(AdapterError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        self.inner.registry.get(name).ok_or_else(|| {
            log::error!("Collection {} is not registered", name);
            AdapterError::new(
                &format!("Collection {} is not registered", name),
                ErrorKind::CollectionNotFound,
            )
        })
    }
}

pub(crate) struct AdapterInner {
    pub(crate) collection_names: Vec<String>,
    pub(crate) config: AdapterConfig,
    pub(crate) factory: DatastoreFactory,
    pub(crate) options: OrmOptions,
    pub(crate) registry: CollectionRegistry,
    connection: Atomic<Connection>,
}

/// Connection state and the generation of the connect attempt owning it.
///
/// Every connect and every close starts a new generation; a connect attempt
/// may only settle the state while its generation is current.
struct Connection {
    state: ConnectionState,
    generation: u64,
}

impl Default for Connection {
    fn default() -> Self {
        Connection {
            state: ConnectionState::Disconnected,
            generation: 0,
        }
    }
}

impl AdapterInner {
    pub(crate) fn state(&self) -> ConnectionState {
        self.connection.read_with(|it| it.state)
    }

    /// Moves from `Disconnected` to `Connecting` and returns the generation
    /// of the new connect attempt, or the current state if it is not
    /// disconnected.
    pub(crate) fn begin_connect(&self) -> Result<u64, ConnectionState> {
        self.connection.write_with(|it| {
            if it.state != ConnectionState::Disconnected {
                return Err(it.state);
            }
            it.generation += 1;
            log::debug!(
                "Adapter state {:?} -> {:?} (attempt {})",
                it.state,
                ConnectionState::Connecting,
                it.generation
            );
            it.state = ConnectionState::Connecting;
            Ok(it.generation)
        })
    }

    /// Settles the connect attempt `generation` on `to`. Does nothing when
    /// a close or a newer connect superseded the attempt.
    pub(crate) fn finish_connect(&self, generation: u64, to: ConnectionState) -> bool {
        self.connection.write_with(|it| {
            if it.generation != generation || it.state != ConnectionState::Connecting {
                return false;
            }
            log::debug!("Adapter state {:?} -> {:?} (attempt {})", it.state, to, generation);
            it.state = to;
            true
        })
    }

    /// Moves to `Disconnected` and supersedes any pending connect attempt.
    pub(crate) fn disconnect(&self) {
        self.connection.write_with(|it| {
            log::debug!("Adapter state {:?} -> {:?}", it.state, ConnectionState::Disconnected);
            it.generation += 1;
            it.state = ConnectionState::Disconnected;
        })
    }
}
