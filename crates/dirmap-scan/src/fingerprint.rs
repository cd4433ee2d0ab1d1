//! Cheap per-file fingerprints.
//!
//! A fingerprint is the lowercase hex of the first `prefix_len` bytes
//! followed by the folded-in metadata, e.g. `41414141_4` for a four byte
//! file containing `AAAA`. Files that agree on their prefix and metadata but
//! differ further in collide by construction.

use std::io;

use dirmap_core::{Fingerprint, FingerprintScheme, ScanConfig};

use crate::source::FileSource;

/// Computes fingerprints from a bounded content prefix and metadata.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintEngine {
    prefix_len: usize,
    scheme: FingerprintScheme,
}

impl FingerprintEngine {
    /// Create an engine reading `prefix_len` bytes per file.
    pub fn new(prefix_len: usize, scheme: FingerprintScheme) -> Self {
        Self {
            prefix_len: prefix_len.max(1),
            scheme,
        }
    }

    /// Create an engine from scan configuration.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.fingerprint_prefix_len, config.fingerprint_scheme)
    }

    /// Number of leading bytes read per file.
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Read the prefix of `file` and compose its fingerprint.
    ///
    /// Read failures are returned to the caller, which records the file as
    /// not fingerprinted.
    pub async fn fingerprint<F>(&self, file: &F) -> io::Result<Fingerprint>
    where
        F: FileSource + ?Sized,
    {
        let prefix = file.read_prefix(self.prefix_len).await?;
        Ok(self.compose(&prefix, file.name(), file.size()))
    }

    /// Compose a fingerprint from already-read bytes.
    pub fn compose(&self, prefix: &[u8], name: &str, size: u64) -> Fingerprint {
        let prefix = &prefix[..prefix.len().min(self.prefix_len)];
        let content = hex::encode(prefix);
        match self.scheme {
            FingerprintScheme::ContentAndSize => Fingerprint::new(format!("{content}_{size}")),
            FingerprintScheme::ContentNameAndSize => {
                Fingerprint::new(format!("{content}_{name}_{size}"))
            }
        }
    }
}

impl Default for FingerprintEngine {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}
