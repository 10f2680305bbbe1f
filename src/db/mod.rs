//! Data module for SourceTrail.
//!
//! Holds the shared data model, the target registry loader and the
//! JSON-backed history store.

mod models;
mod registry;
mod store;

pub use models::*;
pub use registry::*;
pub use store::*;
