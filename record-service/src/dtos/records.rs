use crate::models::Record;
use crate::services::parse_record_id;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordListResponse {
    pub records: Vec<Record>,
}

/// Single-record lookup body, keyed `ID`/`Title`/`Body`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordLookupResponse {
    #[serde(rename = "ID")]
    #[schema(example = "65a1f0c2e4b0a1b2c3d4e5f6")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Body")]
    pub body: String,
}

impl From<Record> for RecordLookupResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: record.title,
            body: record.body,
        }
    }
}

/// Payload for creating a record. A supplied `id` is ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRecordRequest {
    #[serde(default, alias = "ID")]
    pub id: Option<String>,
    #[serde(default, alias = "Title")]
    #[schema(example = "Groceries")]
    pub title: String,
    #[serde(default, alias = "Body")]
    #[schema(example = "Milk, eggs, bread")]
    pub body: String,
}

impl CreateRecordRequest {
    pub fn into_record(self) -> Record {
        Record::new(self.title, self.body)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRecordResponse {
    #[schema(example = "65a1f0c2e4b0a1b2c3d4e5f6")]
    pub id: String,
}

/// Full record to store at `id`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRecordRequest {
    #[serde(alias = "ID")]
    #[validate(
        required(message = "id is required"),
        length(equal = 24, message = "id must be a 24-character hex ObjectId")
    )]
    #[schema(example = "65a1f0c2e4b0a1b2c3d4e5f6")]
    pub id: Option<String>,
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Body")]
    pub body: String,
}

impl UpdateRecordRequest {
    pub fn into_record(self) -> Result<Record, AppError> {
        let raw = self
            .id
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("id is required")))?;
        let id = parse_record_id(&raw).map_err(|e| AppError::BadRequest(anyhow::Error::new(e)))?;
        Ok(Record::new(self.title, self.body).with_id(id))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRecordResponse {
    pub record: Record,
}
