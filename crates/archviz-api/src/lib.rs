//! HTTP surface for archviz video jobs.

pub mod config;
pub mod error;
pub mod server;
