use crate::adapter::latch::CompletionLatch;
use crate::adapter::NedbAdapter;
use crate::errors::{AdapterError, AdapterResult, ErrorKind};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Connection state of a [NedbAdapter].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

impl NedbAdapter {
    /// Opens and loads the datastore of every model collection.
    ///
    /// All datastores are registered right away and loaded concurrently, so
    /// a handle may be visible before its load completed. `callback` fires
    /// exactly once: with the first load error, or with success once every
    /// load succeeded. Without models it succeeds immediately.
    ///
    /// Fails through `callback` when the adapter is not disconnected.
    pub fn connect<F>(&self, callback: F)
    where
        F: FnOnce(AdapterResult<()>) + Send + 'static,
    {
        let generation = match self.inner.begin_connect() {
            Ok(generation) => generation,
            Err(state) => {
                log::error!("Cannot connect an adapter which is {}", state);
                callback(Err(AdapterError::new(
                    &format!("Cannot connect an adapter which is {}", state),
                    ErrorKind::InvalidArgument,
                )));
                return;
            }
        };

        let names = self.inner.collection_names.clone();
        if names.is_empty() {
            log::debug!("No models registered, nothing to load");
            self.inner.finish_connect(generation, ConnectionState::Connected);
            callback(Ok(()));
            return;
        }

        let inner = Arc::clone(&self.inner);
        let latch = Arc::new(CompletionLatch::new(
            names.len(),
            Box::new(move |result: AdapterResult<()>| {
                let next = match &result {
                    Ok(()) => ConnectionState::Connected,
                    Err(err) => {
                        log::error!("Failed to connect: {}", err);
                        ConnectionState::Disconnected
                    }
                };
                if !inner.finish_connect(generation, next) {
                    log::warn!("Connect attempt {} was superseded, state left unchanged", generation);
                }
                callback(result)
            }),
        ));

        for name in names {
            let options = self.inner.config.datastore_options(&name);
            let datastore = self.inner.factory.create(options);
            self.inner.registry.register(&name, datastore.clone());

            log::debug!("Loading collection {}", name);
            let latch = Arc::clone(&latch);
            datastore.load_database(Box::new(move |result| {
                match &result {
                    Ok(()) => log::debug!("Collection {} loaded", name),
                    Err(err) => log::error!("Failed to load collection {}: {}", name, err),
                }
                latch.count_down(result)
            }));
        }
    }

    /// Drops every registered datastore handle and signals success.
    ///
    /// Subsequent operations fail with `CollectionNotFound` until the next
    /// connect. A connect still loading keeps its callback but can no longer
    /// change the state.
    pub fn close<F>(&self, callback: F)
    where
        F: FnOnce(AdapterResult<()>) + Send + 'static,
    {
        self.inner.registry.clear();
        self.inner.disconnect();
        callback(Ok(()))
    }
}
