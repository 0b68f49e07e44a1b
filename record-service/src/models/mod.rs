pub mod record;

pub use record::{Record, RecordDocument};
