use crate::models::{Record, RecordDocument};
use crate::services::error::StoreError;
use crate::services::store::{observe, parse_record_id, RecordStore};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process record store with the same semantics as the MongoDB one.
///
/// Records are listed in identifier order, which for generated ObjectIds is
/// creation order.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<BTreeMap<ObjectId, RecordDocument>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        observe("list_all", async {
            let records = self.records.read().await;
            Ok(records.values().cloned().map(Record::from).collect())
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Record, StoreError> {
        observe("get_by_id", async {
            let oid = parse_record_id(id)?;
            let document = self.records.read().await.get(&oid).cloned();
            document
                .map(Record::from)
                .ok_or_else(|| StoreError::NotFound(oid.to_hex()))
        })
        .await
    }

    async fn create(&self, record: Record) -> Result<ObjectId, StoreError> {
        observe("create", async {
            let id = ObjectId::new();
            let document = RecordDocument::new(id, record.title, record.body);
            self.records.write().await.insert(id, document);
            tracing::info!(record_id = %id, "Created record");
            Ok(id)
        })
        .await
    }

    async fn update(&self, record: Record) -> Result<Record, StoreError> {
        observe("update", async {
            let id = record.id.ok_or(StoreError::MissingId)?;
            let document = RecordDocument::new(id, record.title, record.body);
            self.records.write().await.insert(id, document.clone());
            tracing::info!(record_id = %id, "Saved record");
            Ok::<_, StoreError>(Record::from(document))
        })
        .await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
