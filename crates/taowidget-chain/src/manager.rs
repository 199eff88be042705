//! Ownership and recovery of the single chain connection used by a request.
//!
//! A [`ConnectionManager`] lazily creates one connection through its
//! [`Connector`] and lends it to callers for the duration of
//! [`ConnectionManager::acquire`]. A scope that ends in an error leaves the
//! connection marked failed; the next acquisition closes it and dials a
//! fresh one. Nothing is retried inside a scope.

use futures::future::BoxFuture;

use crate::client::{ChainConnection, Connector};
use crate::error::ChainError;

enum ConnectionState<C> {
    /// No connection yet, or the last one was closed or lost.
    Unset,
    /// Connection whose last scope completed successfully.
    Live(C),
    /// Connection whose last scope failed. Replaced on next acquisition.
    Failed(C),
}

/// Observable state of a [`ConnectionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Unset,
    Live,
    Failed,
}

/// Holds at most one connection and recreates it after failures.
///
/// Not shared between requests: every request builds its own manager and
/// closes it when done.
pub struct ConnectionManager<K: Connector> {
    connector: K,
    state: ConnectionState<K::Connection>,
}

impl<K: Connector> ConnectionManager<K> {
    pub fn new(connector: K) -> Self {
        Self {
            connector,
            state: ConnectionState::Unset,
        }
    }

    pub fn state(&self) -> ManagerState {
        match self.state {
            ConnectionState::Unset => ManagerState::Unset,
            ConnectionState::Live(_) => ManagerState::Live,
            ConnectionState::Failed(_) => ManagerState::Failed,
        }
    }

    /// Run `op` with a working connection.
    ///
    /// Connects first if there is no connection, or if the previous scope
    /// failed (after closing the stale one). Connection errors are returned
    /// as-is. An error returned by `op` marks the connection failed.
    ///
    /// While `op` runs the connection is owned by this call, so dropping the
    /// returned future drops the connection and leaves the manager unset.
    pub async fn acquire<T, F>(&mut self, op: F) -> Result<T, ChainError>
    where
        F: for<'c> FnOnce(&'c K::Connection) -> BoxFuture<'c, Result<T, ChainError>>,
    {
        let connection = self.take_or_connect().await?;

        let outcome = op(&connection).await;

        self.state = match &outcome {
            Ok(_) => ConnectionState::Live(connection),
            Err(e) => {
                tracing::warn!("Chain operation failed, connection will be replaced: {}", e);
                ConnectionState::Failed(connection)
            }
        };
        outcome
    }

    /// Close the held connection, if any. Safe to call repeatedly.
    pub async fn close(&mut self) {
        match std::mem::replace(&mut self.state, ConnectionState::Unset) {
            ConnectionState::Live(connection) | ConnectionState::Failed(connection) => {
                discard(connection).await;
            }
            ConnectionState::Unset => {}
        }
    }

    async fn take_or_connect(&mut self) -> Result<K::Connection, ChainError> {
        match std::mem::replace(&mut self.state, ConnectionState::Unset) {
            ConnectionState::Live(connection) => Ok(connection),
            ConnectionState::Failed(stale) => {
                tracing::info!("Replacing failed chain connection");
                discard(stale).await;
                self.connector.connect().await
            }
            ConnectionState::Unset => {
                tracing::debug!("Opening chain connection");
                self.connector.connect().await
            }
        }
    }
}

/// Best-effort close; errors are logged and dropped.
async fn discard<C: ChainConnection>(mut connection: C) {
    if let Err(e) = connection.close().await {
        tracing::debug!("Ignoring error while closing chain connection: {}", e);
    }
}
