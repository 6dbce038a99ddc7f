//! Core domain types and logic.

pub mod price;
pub mod merge;
pub mod rolling;
pub mod enrich;
pub mod aggregate;
pub mod correlation;
pub mod config;
pub mod pipeline;
pub mod error;
