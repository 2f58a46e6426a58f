//! Business logic services for the Store Inspection Platform

pub mod auth;
pub mod inspection;
pub mod reporting;
pub mod store;

pub use auth::AuthService;
pub use inspection::InspectionService;
pub use reporting::ReportingService;
pub use store::StoreService;
