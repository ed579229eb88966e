//! AMC Scheduler - quarter-aligned payment schedule engine
//!
//! This library provides:
//! - A fixed calendar-quarter model (quarters start on the 5th of Jan/Apr/Jul/Oct)
//! - Contract-year partitioning with per-year rate schedules
//! - Day-prorated allocation of quarterly charges with residual catch-up payments
//! - Flat-tax aggregation with a per-quarter audit trail
//! - Chunked, parallel batch processing with progress reporting

pub mod batch;
pub mod calendar;
pub mod contract;
pub mod engine;
pub mod error;

// Re-export commonly used types
pub use batch::{BatchConfig, BatchOutput, BatchProcessor, BatchSummary, RecordResult};
pub use calendar::{QuarterKey, QuarterLabel};
pub use contract::{ContractKind, ContractRecord};
pub use engine::{EngineConfig, ScheduleEngine, ScheduleResult};
pub use error::EngineError;
