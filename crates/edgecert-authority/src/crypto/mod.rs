//! Certificate authority, issuance and credential bundle encoding.

mod bundle;
mod ca;
mod cert_extractor;
mod serial;

pub use bundle::{assemble, encode_certificate, EncodingError};
pub use ca::{CaError, CertificateAuthority, SignedCertificate, SigningError, MAX_COMMON_NAME_LEN};
pub use cert_extractor::{inspect_certificate, CertExtractError, CertificateDetails};
pub use serial::SerialAllocator;
