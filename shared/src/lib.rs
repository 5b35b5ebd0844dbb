//! Shared domain types for the Commerce Master Data Platform
//!
//! This crate contains the pure domain layer shared by the backend service:
//! stock-adjustment arithmetic, counter application rules, entity enums,
//! and input validation helpers. It performs no I/O.

pub mod adjustment;
pub mod models;
pub mod types;
pub mod validation;

pub use adjustment::*;
pub use models::*;
pub use types::*;
pub use validation::*;
