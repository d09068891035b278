//! SHA-256 content digests.
//!
//! Sentinel names for provisioning handlers embed the digest of the source
//! at execution time, so a content change is a name change.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::Error;
use crate::platform::Fs;

/// Hex-encoded SHA-256 of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Hex-encoded SHA-256 of a file's contents.
pub fn sha256_file(fs: &impl Fs, path: &Path) -> Result<String, Error> {
    let bytes = fs.read(path).map_err(|e| Error::io("read", path, e))?;
    Ok(sha256_bytes(&bytes))
}
