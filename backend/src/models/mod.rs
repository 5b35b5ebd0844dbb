//! Domain models for the Commerce Master Data Platform
//!
//! Re-exports domain enums from the shared crate; row and input types
//! live next to the services that own them.

pub use shared::models::*;
