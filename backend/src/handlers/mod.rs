//! HTTP request handlers

pub mod auth;
pub mod health;
pub mod inspection;
pub mod reporting;
pub mod store;

pub use auth::*;
pub use health::*;
pub use inspection::*;
pub use reporting::*;
pub use store::*;
