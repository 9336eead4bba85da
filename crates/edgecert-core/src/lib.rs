//! edgecert Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/gRPC
//! - Cryptography
//! - Runtime specifics
//!
//! Both the credential authority and the bootstrap requester share these
//! types so that the wire format and the on-disk layout stay in one place.

pub mod artifacts;
pub mod credentials;
pub mod error;
pub mod ids;
pub mod lookup;

// Re-export commonly used types
pub use artifacts::{ArtifactKind, ArtifactLayout};
pub use credentials::{CredentialBundle, CredentialRequest};
pub use error::CoreError;
pub use ids::ApplicationId;
pub use lookup::LookupResult;
