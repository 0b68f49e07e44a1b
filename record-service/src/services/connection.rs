//! Verified, deadline-bounded MongoDB connections.
//!
//! Every acquisition gets a deadline of `MongoConfig::timeout()` measured
//! from the call. Client construction, server selection and the liveness
//! ping must all succeed before a handle is given out; any failure aborts
//! the acquisition with a [`ConnectionError`].

use crate::config::{ConnectionLifecycle, MongoConfig};
use crate::models::RecordDocument;
use crate::services::error::{ConnectionError, StoreError};
use mongodb::{bson::doc, options::ClientOptions, Client as MongoClient, Collection};
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

#[derive(Clone)]
pub struct ConnectionProvider {
    settings: MongoConfig,
    shared: Option<MongoClient>,
}

impl ConnectionProvider {
    /// With [`ConnectionLifecycle::Shared`] the shared client is connected
    /// and verified here, so an unreachable cluster fails startup.
    pub async fn new(settings: MongoConfig) -> Result<Self, StoreError> {
        let shared = match settings.lifecycle {
            ConnectionLifecycle::PerOperation => None,
            ConnectionLifecycle::Shared => {
                let deadline = Instant::now() + settings.timeout();
                Some(connect(&settings, deadline).await?)
            }
        };

        tracing::info!(
            endpoint = %settings.endpoint,
            database = %settings.database,
            collection = %settings.collection,
            lifecycle = ?settings.lifecycle,
            "MongoDB connection provider ready"
        );

        Ok(Self { settings, shared })
    }

    pub fn timeout(&self) -> Duration {
        self.settings.timeout()
    }

    /// Run `op` against the record collection and release the connection on
    /// every exit path, including timeouts.
    pub async fn with_collection<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(Collection<RecordDocument>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let deadline = Instant::now() + self.timeout();

        match &self.shared {
            Some(client) => self.run(deadline, op(self.collection(client))).await,
            None => {
                let client = connect(&self.settings, deadline).await?;
                let result = self.run(deadline, op(self.collection(&client))).await;
                client.shutdown().await;
                tracing::debug!("Released MongoDB connection");
                result
            }
        }
    }

    /// Round-trip liveness check against the cluster.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let deadline = Instant::now() + self.timeout();

        match &self.shared {
            Some(client) => self.run(deadline, ping(client)).await,
            None => {
                let client = connect(&self.settings, deadline).await?;
                client.shutdown().await;
                Ok(())
            }
        }
    }

    fn collection(&self, client: &MongoClient) -> Collection<RecordDocument> {
        client
            .database(&self.settings.database)
            .collection(&self.settings.collection)
    }

    async fn run<T>(
        &self,
        deadline: Instant,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match timeout_at(deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout(), "MongoDB operation timed out");
                Err(StoreError::Timeout(self.timeout()))
            }
        }
    }
}

async fn ping(client: &MongoClient) -> Result<(), StoreError> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await
        .map_err(|e| {
            let err = ConnectionError::from_ping(e);
            tracing::error!(error = %err, "MongoDB liveness check failed");
            StoreError::from(err)
        })?;
    Ok(())
}

async fn client_options(settings: &MongoConfig) -> Result<ClientOptions, ConnectionError> {
    let mut options = ClientOptions::parse(settings.connection_uri())
        .await
        .map_err(ConnectionError::Construct)?;
    options.app_name = Some("record-service".to_string());
    if settings.lifecycle == ConnectionLifecycle::Shared {
        options.max_pool_size = Some(settings.max_pool_size);
        options.max_idle_time = Some(settings.max_idle_time());
    }
    Ok(options)
}

/// Three quarters of what is left before the deadline.
fn selection_budget(remaining: Duration) -> Duration {
    remaining.saturating_sub(remaining / 4)
}

async fn connect(settings: &MongoConfig, deadline: Instant) -> Result<MongoClient, StoreError> {
    let timeout = settings.timeout();

    let mut options = match timeout_at(deadline, client_options(settings)).await {
        Ok(Ok(options)) => options,
        Ok(Err(e)) => {
            tracing::error!(error = %e, endpoint = %settings.endpoint, "Failed to create client");
            return Err(e.into());
        }
        Err(_) => return Err(StoreError::Timeout(timeout)),
    };

    // The driver must give up on server selection before the acquisition
    // deadline so an unreachable cluster surfaces as a connect failure.
    let budget = selection_budget(deadline.saturating_duration_since(Instant::now()));
    options.connect_timeout = Some(budget);
    options.server_selection_timeout = Some(budget);

    let client = MongoClient::with_options(options).map_err(|e| {
        let err = ConnectionError::Construct(e);
        tracing::error!(error = %err, endpoint = %settings.endpoint, "Failed to create client");
        StoreError::from(err)
    })?;

    // Force a round trip so a bad address or credentials fail here
    match timeout_at(deadline, ping(&client)).await {
        Ok(Ok(())) => {
            tracing::debug!(endpoint = %settings.endpoint, "Connected to MongoDB");
            Ok(client)
        }
        Ok(Err(e)) => {
            client.shutdown().await;
            Err(e)
        }
        Err(_) => {
            tracing::error!(endpoint = %settings.endpoint, timeout = ?timeout, "Timed out connecting to MongoDB");
            client.shutdown().await;
            Err(StoreError::Timeout(timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_budget_leaves_headroom_before_deadline() {
        assert_eq!(selection_budget(Duration::from_secs(4)), Duration::from_secs(3));
        assert_eq!(
            selection_budget(Duration::from_secs(1)),
            Duration::from_millis(750)
        );
        assert!(selection_budget(Duration::from_millis(10)) < Duration::from_millis(10));
        assert_eq!(selection_budget(Duration::ZERO), Duration::ZERO);
    }
}
