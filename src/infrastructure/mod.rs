//! Infrastructure layer: member stores, selection, and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod dedup;
pub mod di;
pub mod error;
pub mod repository;
pub mod traits;

pub use error::{InfraError, InfraResult};
