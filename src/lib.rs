// SLCSP Calculator - Core Library
// Exposes the registry, catalog loader and resolver for the CLI and tests

pub mod catalog;
pub mod config;
pub mod entities;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use catalog::{CatalogStats, PlanCatalogLoader};
pub use config::Config;
pub use entities::{MetalLevel, Plan, Premium, RateArea, RateAreaId};
pub use error::SlcspError;
pub use pipeline::{run, run_with_config, write_report, RunReport};
pub use records::{
    load_plan_records, load_zip_records, read_target_table, write_target_table,
    PlanRecord, TargetTable, ZipRecord,
};
pub use registry::{parse_rate_area_id, RateAreaRegistry};
pub use resolver::{OutputRow, Resolution, ResolutionSummary, SlcspResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
