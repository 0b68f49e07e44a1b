pub mod connection;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod store;

pub use connection::ConnectionProvider;
pub use error::{ConnectionError, StoreError};
pub use memory::InMemoryRecordStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::{parse_record_id, MongoRecordStore, RecordStore};
