//! HTTP request handlers.

mod credentials;
mod health;

pub use credentials::{issue_credentials, request_credentials};
pub use health::health_check;
