//! Pipeline module - orchestrates the funnel analysis steps

pub mod analysis;
pub mod cascade;
pub mod cohort;
pub mod economic;
pub mod error;
pub mod loader;
pub mod model;
pub mod record;
pub mod risk;
pub mod stages;

pub use analysis::*;
pub use cascade::*;
pub use cohort::*;
pub use economic::*;
pub use error::FunnelError;
pub use loader::*;
pub use model::{FeatureScaler, FitConfig, LogisticModel};
pub use record::*;
pub use risk::*;
pub use stages::*;
