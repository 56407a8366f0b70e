//! Core types and traits for the archviz video job API.
//!
//! Response DTOs use camelCase field names to match the browser client.

mod dto;
mod traits;

pub use dto::*;
pub use traits::*;
