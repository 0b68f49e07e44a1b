use mongodb::error::{Error as MongoError, ErrorKind};
use service_core::error::AppError;
use std::time::Duration;
use thiserror::Error;

/// Failure while opening a verified connection to MongoDB.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to create client: {0}")]
    Construct(MongoError),

    #[error("Failed to connect to cluster: {0}")]
    Connect(MongoError),

    #[error("Failed to ping cluster: {0}")]
    Ping(MongoError),
}

impl ConnectionError {
    /// Server selection failures mean no server was reachable at all.
    pub(crate) fn from_ping(err: MongoError) -> Self {
        match *err.kind {
            ErrorKind::ServerSelection { .. } => ConnectionError::Connect(err),
            _ => ConnectionError::Ping(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Query failed: {0}")]
    Query(MongoError),

    #[error("Write failed: {0}")]
    Write(MongoError),

    #[error("Failed to decode record: {0}")]
    Decode(String),

    #[error("Record {0} not found")]
    NotFound(String),

    #[error("Invalid record id: {0}")]
    InvalidId(String),

    #[error("Record id is required for update")]
    MissingId,
}

fn is_decode(err: &MongoError) -> bool {
    matches!(*err.kind, ErrorKind::BsonDeserialization(_))
}

impl StoreError {
    pub(crate) fn query(err: MongoError) -> Self {
        if is_decode(&err) {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Query(err)
        }
    }

    pub(crate) fn write(err: MongoError) -> Self {
        if is_decode(&err) {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Write(err)
        }
    }

    /// Short label used for the `outcome` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Connection(_) => "connection_error",
            StoreError::Timeout(_) => "timeout",
            StoreError::Query(_) => "query_error",
            StoreError::Write(_) => "write_error",
            StoreError::Decode(_) => "decode_error",
            StoreError::NotFound(_) => "not_found",
            StoreError::InvalidId(_) => "invalid_id",
            StoreError::MissingId => "missing_id",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) | StoreError::InvalidId(_) => {
                AppError::NotFound(anyhow::Error::new(err))
            }
            StoreError::MissingId => AppError::BadRequest(anyhow::Error::new(err)),
            _ => AppError::DatabaseError(anyhow::Error::new(err)),
        }
    }
}
