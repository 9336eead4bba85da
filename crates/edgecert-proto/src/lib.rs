//! Generated gRPC code and converters for the application lookup service.
//!
//! This crate contains:
//! - Generated protobuf message types
//! - Generated gRPC service stubs (client and server)
//! - Converters between proto types and domain types

pub mod convert;

/// Generated protobuf types and services.
pub mod pb {
    // The path matches the proto package: eva
    include!("gen/eva.rs");
}

// Re-export commonly used types
pub use pb::ip_application_lookup_service_client::IpApplicationLookupServiceClient;
pub use pb::ip_application_lookup_service_server::{
    IpApplicationLookupService, IpApplicationLookupServiceServer,
};
