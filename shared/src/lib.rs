//! Shared types and models for the Store Inspection Platform
//!
//! This crate contains the inspection records, form validation and dashboard
//! statistics shared between the backend, the browser client (via WASM),
//! and other components of the system.

pub mod models;
pub mod stats;
pub mod types;
pub mod validation;

pub use models::*;
pub use stats::*;
pub use types::*;
pub use validation::*;
