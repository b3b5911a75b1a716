//! Pipeline module - the churn modelling stages

pub mod columns;
pub mod config;
pub mod correlation;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod loader;
pub mod missing;
pub mod outliers;
pub mod profile;
pub mod split;
pub mod tree;

pub use columns::*;
pub use config::*;
pub use correlation::*;
pub use error::*;
pub use evaluate::*;
pub use features::*;
pub use loader::*;
pub use missing::*;
pub use outliers::*;
pub use profile::*;
pub use split::*;
pub use tree::{
    find_candidate_thresholds, ClassCounts, DecisionTree, DecisionTreeParams, Node, MAX_TREE_DEPTH,
};
