//! Domain models for the Store Inspection Platform

mod checklist;
mod inspection;
mod store;
mod user;

pub use checklist::*;
pub use inspection::*;
pub use store::*;
pub use user::*;
