//! HTTP API server for the Formbox form intake service.
//!
//! This crate provides the HTTP control plane:
//! - Form definition CRUD endpoints
//! - Public submission intake
//! - API key authentication
//! - The uniform CORS response envelope

pub mod auth;
pub mod bootstrap;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::AuthenticatedKey;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
