use std::fmt::Write;

use sha2::{Digest, Sha256};

fn hex_digest(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}

/// Hex SHA-256 over the primary payload followed by the secondary one, when it ran.
pub fn payload_digest(primary_raw: &str, secondary_raw: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(primary_raw.as_bytes());
    if let Some(secondary) = secondary_raw {
        hasher.update(secondary.as_bytes());
    }
    hex_digest(&hasher.finalize())
}
