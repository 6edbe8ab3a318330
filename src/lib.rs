pub mod analytics;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod record;
pub mod source;

pub use analytics::{compute_efficiency, compute_monthly_rollup};
pub use record::RefuelRecord;
