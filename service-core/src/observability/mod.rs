pub mod logging;
pub mod panic;

pub use logging::init_tracing;
pub use panic::{panic_reporting_layer, report_panic};
