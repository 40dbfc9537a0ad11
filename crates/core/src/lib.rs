//! Core domain types for the Formbox form intake service.
//!
//! This crate provides the shared vocabulary of the system:
//! - Form schemas and field descriptors
//! - Schema and submission-value validation
//! - Configuration types
//! - Core error type

pub mod config;
pub mod error;
pub mod schema;

pub use error::{Error, Result};
pub use schema::{FieldDescriptor, FieldType, validate_schema, validate_values};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Hard cap for list endpoint page sizes.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Maximum length of a field name within a form schema.
pub const MAX_FIELD_NAME_LEN: usize = 128;

/// Maximum number of fields in a single form schema.
pub const MAX_SCHEMA_FIELDS: usize = 256;
