pub mod examples;
pub mod health;
pub mod metrics;
pub mod records;

pub use health::{health_check, readiness_check};
pub use records::{create_record, get_record, list_records, update_record};
