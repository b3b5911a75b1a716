//! churntree: customer churn modelling with decision trees
//!
//! A library for profiling a churn dataset, cleaning and encoding it,
//! and training depth-bounded decision trees evaluated by ROC AUC.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
