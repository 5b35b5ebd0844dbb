//! Domain enums shared between modules

mod attributes;
mod inventory;

pub use attributes::*;
pub use inventory::*;
