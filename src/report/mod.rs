//! Report module - summarizing funnel analysis results

pub mod export;
pub mod importance;
pub mod summary;

pub use export::*;
pub use importance::*;
pub use summary::*;
