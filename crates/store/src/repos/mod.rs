//! Repository traits implemented by every store backend.

pub mod forms;
pub mod keys;
pub mod submissions;

pub use forms::FormRepo;
pub use keys::ApiKeyRepo;
pub use submissions::SubmissionRepo;
