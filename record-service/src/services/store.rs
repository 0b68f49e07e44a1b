use crate::models::{Record, RecordDocument};
use crate::services::connection::ConnectionProvider;
use crate::services::error::StoreError;
use async_trait::async_trait;
use futures::TryStreamExt;
use metrics::{counter, histogram};
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOneAndReplaceOptions, ReturnDocument},
};
use std::future::Future;
use std::time::Instant;

/// Persistence for [`Record`] documents.
///
/// Each call is independent; no ordering is guaranteed between concurrent
/// calls and atomicity is limited to a single document.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record, in store order. An empty collection yields an empty vec.
    async fn list_all(&self) -> Result<Vec<Record>, StoreError>;

    /// Exact identifier match; [`StoreError::NotFound`] when nothing matches.
    async fn get_by_id(&self, id: &str) -> Result<Record, StoreError>;

    /// Insert under a freshly generated identifier, ignoring any id on `record`.
    async fn create(&self, record: Record) -> Result<ObjectId, StoreError>;

    /// Replace the whole document at `record.id`, creating it if absent,
    /// and return the stored version.
    async fn update(&self, record: Record) -> Result<Record, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str;
}

pub fn parse_record_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id.trim()).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Record store backed by a MongoDB collection.
#[derive(Clone)]
pub struct MongoRecordStore {
    provider: ConnectionProvider,
}

impl MongoRecordStore {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        observe("list_all", async {
            self.provider
                .with_collection(|records| async move {
                    let cursor = records.find(None, None).await.map_err(StoreError::query)?;
                    let docs: Vec<RecordDocument> =
                        cursor.try_collect().await.map_err(StoreError::query)?;
                    Ok::<Vec<Record>, StoreError>(docs.into_iter().map(Record::from).collect())
                })
                .await
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Record, StoreError> {
        observe("get_by_id", async {
            let oid = parse_record_id(id)?;
            self.provider
                .with_collection(|records| async move {
                    records
                        .find_one(doc! { "_id": oid }, None)
                        .await
                        .map_err(StoreError::query)?
                        .map(Record::from)
                        .ok_or_else(|| StoreError::NotFound(oid.to_hex()))
                })
                .await
        })
        .await
    }

    async fn create(&self, record: Record) -> Result<ObjectId, StoreError> {
        observe("create", async {
            let document = RecordDocument::new(ObjectId::new(), record.title, record.body);
            self.provider
                .with_collection(|records| async move {
                    let result = records
                        .insert_one(&document, None)
                        .await
                        .map_err(StoreError::write)?;
                    let id = result.inserted_id.as_object_id().ok_or_else(|| {
                        StoreError::Decode(format!(
                            "unexpected inserted id {}",
                            result.inserted_id
                        ))
                    })?;
                    tracing::info!(record_id = %id, "Created record");
                    Ok::<_, StoreError>(id)
                })
                .await
        })
        .await
    }

    async fn update(&self, record: Record) -> Result<Record, StoreError> {
        observe("update", async {
            let id = record.id.ok_or(StoreError::MissingId)?;
            let replacement = RecordDocument::new(id, record.title, record.body);
            let options = FindOneAndReplaceOptions::builder()
                .upsert(true)
                .return_document(ReturnDocument::After)
                .build();

            self.provider
                .with_collection(|records| async move {
                    let stored = records
                        .find_one_and_replace(doc! { "_id": id }, &replacement, options)
                        .await
                        .map_err(StoreError::write)?
                        .ok_or_else(|| {
                            StoreError::Decode(format!("upsert of {} returned no document", id))
                        })?;
                    tracing::info!(record_id = %id, "Saved record");
                    Ok::<_, StoreError>(Record::from(stored))
                })
                .await
        })
        .await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.provider.ping().await
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

/// Records outcome and latency for a store operation and logs failures.
pub(crate) async fn observe<T>(
    operation: &'static str,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    let start = Instant::now();
    let result = fut.await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };

    counter!("record_store_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    histogram!("record_store_operation_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());

    if let Err(e) = &result {
        match e {
            StoreError::NotFound(_) | StoreError::InvalidId(_) => {
                tracing::debug!(operation = %operation, error = %e, "Record lookup missed")
            }
            _ => tracing::error!(operation = %operation, error = %e, "Record store operation failed"),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_ids() {
        let id = parse_record_id("000000000000000000000000").unwrap();
        assert_eq!(id.to_hex(), "000000000000000000000000");
        assert!(parse_record_id(" 65a1f0c2e4b0a1b2c3d4e5f6 ").is_ok());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(matches!(
            parse_record_id("42"),
            Err(StoreError::InvalidId(id)) if id == "42"
        ));
        assert!(parse_record_id("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }
}
