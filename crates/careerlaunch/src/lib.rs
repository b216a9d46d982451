//! Core of the CareerLaunch recruitment platform.
//!
//! Each component (catalog, applications, portfolio, profiles, admin) owns its
//! domain types, service, and axum router, plus a repository trait where it
//! keeps records of its own. [`memory::MemoryStore`] implements every
//! repository for the API binary and tests.

pub mod admin;
pub mod applications;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod memory;
pub mod notifications;
pub mod portfolio;
pub mod profiles;
pub mod repository;
pub mod telemetry;

pub use error::{AppError, ErrorKind};
pub use identity::{Caller, Role, UserId};
