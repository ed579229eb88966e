//! Contract input records and contract-year partitioning

pub mod loader;
pub mod partition;
pub mod record;

pub use loader::{load_records, load_records_from_reader};
pub use partition::{partition, ContractYearWindow};
pub use record::{ContractKind, ContractRecord};
