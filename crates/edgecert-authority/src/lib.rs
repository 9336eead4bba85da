//! edgecert credential authority library.
//!
//! Authorizes application certificate signing requests against the
//! application registry and signs them with a locally held CA.

pub mod config;
pub mod crypto;
pub mod http;
pub mod registry;
pub mod state;
pub mod tls;

pub use config::Config;
pub use registry::{ApplicationLookup, LookupError, RegistryClient};
pub use state::{AppState, IssuancePolicy};
