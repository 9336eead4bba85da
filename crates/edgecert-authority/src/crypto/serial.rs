//! Serial number allocation for issued certificates.
//!
//! Each serial is 16 bytes: an 8-byte random prefix followed by an 8-byte
//! big-endian counter. The counter makes serials unique for the lifetime of
//! the allocator even under concurrent issuance; the random prefix keeps
//! serials from different processes holding the same CA apart and avoids
//! predictable values.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::RngCore;
use rcgen::SerialNumber;

/// Length of an allocated serial number in bytes.
pub const SERIAL_LEN: usize = 16;

/// Thread-safe source of certificate serial numbers.
#[derive(Debug, Default)]
pub struct SerialAllocator {
    counter: AtomicU64,
}

impl SerialAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next serial number.
    pub fn next_serial(&self) -> SerialNumber {
        SerialNumber::from(self.next_bytes().to_vec())
    }

    /// Number of serials handed out so far.
    pub fn allocated(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    fn next_bytes(&self) -> [u8; SERIAL_LEN] {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed) + 1;

        let mut bytes = [0u8; SERIAL_LEN];
        rand::thread_rng().fill_bytes(&mut bytes[..8]);
        // Positive, and no leading zero byte so the DER encoding keeps all 16 bytes.
        bytes[0] = (bytes[0] & 0x7f) | 0x40;
        bytes[8..].copy_from_slice(&sequence.to_be_bytes());
        bytes
    }
}
