//! Request handlers for the Commerce Master Data Platform

pub mod attributes;
pub mod catalogue;
pub mod crm;
pub mod health;
pub mod inventory;
pub mod lot;
pub mod pricing;

pub use attributes::*;
pub use catalogue::*;
pub use crm::*;
pub use health::*;
pub use inventory::*;
pub use lot::*;
pub use pricing::*;
