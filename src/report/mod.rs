//! Report module - charts, terminal tables and the run report

pub mod charts;
pub mod run_report;
pub mod summary;

pub use charts::*;
pub use run_report::*;
pub use summary::*;
