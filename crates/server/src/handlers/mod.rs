//! HTTP request handlers.

pub mod forms;
pub mod health;
pub mod submissions;

pub use forms::{create_form, delete_form, get_form, list_forms, update_form};
pub use health::{health_check, not_found};
pub use submissions::{get_submission, list_submissions, submit_form};
