//! Converters between proto types and domain types.

use std::net::IpAddr;

use edgecert_core::LookupResult;

use crate::pb;

impl From<IpAddr> for pb::IpApplicationLookupInfo {
    fn from(ip: IpAddr) -> Self {
        pb::IpApplicationLookupInfo {
            ip_address: ip.to_string(),
        }
    }
}

impl From<pb::IpApplicationLookupResult> for LookupResult {
    fn from(result: pb::IpApplicationLookupResult) -> Self {
        LookupResult::from_application_id(result.app_id)
    }
}
