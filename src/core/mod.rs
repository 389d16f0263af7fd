pub mod config;
pub mod enrichment;
pub mod exact;
pub mod fuzzy;
pub mod lineage;
pub mod report;
pub mod resolver;
pub mod scheduler;
pub mod similarity;

pub use config::Config;
pub use report::ResolutionReport;
pub use resolver::{CrosswalkResolver, Resolution};
