pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod expiry;
pub mod handlers;
pub mod model;
pub mod server;
pub mod validator;

/// Shared application state threaded through axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Catalog-backed validator; holds no per-request state.
    pub validator: validator::Validator,
}

pub use config::PresentationDefaults;
pub use error::ValidationError;
pub use server::{router, run, ServerConfig};
pub use validator::{render, LicenseRequest, ValidationResult, Validator};
