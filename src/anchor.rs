// anchor.rs — Trust anchor cache-or-fetch
//
// The profile signature is validated against exactly one root certificate.
// The anchor is looked up at a cache path first; only a truly absent file
// triggers the single network fetch. An existing-but-empty file is invalid,
// not "missing" — it is never silently overwritten by a re-fetch.
//
// Cache staleness is out of scope: a non-empty cached certificate is used
// as-is, with no expiry or refresh policy.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use openssl::x509::X509;

use crate::error::{Error, Result};
use crate::hash;

/// Fixed well-known location of the Apple root certificate.
pub const APPLE_ROOT_CA_URL: &str = "https://www.apple.com/appleca/AppleIncRootCertificate.cer";

/// Default cache path for the fetched root certificate.
pub fn default_cache_path() -> PathBuf {
    std::env::temp_dir().join("AppleIncRootCertificate.cer")
}

/// The sole trust root for one pipeline run. Immutable once loaded.
#[derive(Debug)]
pub struct TrustAnchor {
    raw: Vec<u8>,
    certificate: X509,
}

impl TrustAnchor {
    /// Load the anchor from `path`, fetching it from [`APPLE_ROOT_CA_URL`]
    /// first if and only if no file exists there.
    pub fn obtain(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = fs::read(path)?;
            if raw.is_empty() {
                return Err(Error::TrustAnchorUnavailable(format!(
                    "certificate file {} exists but is empty; refusing to overwrite it",
                    path.display()
                )));
            }
            return Self::from_bytes(raw);
        }

        let raw = fetch_root_certificate()?;
        write_atomic(path, &raw)?;
        Self::from_bytes(raw)
    }

    /// Parse anchor bytes as an X509 certificate, DER first, PEM as fallback.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        let certificate = X509::from_der(&raw)
            .or_else(|_| X509::from_pem(&raw))
            .map_err(|e| {
                Error::TrustAnchorUnavailable(format!("not a DER or PEM certificate: {e}"))
            })?;
        Ok(TrustAnchor { raw, certificate })
    }

    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// SHA-256 fingerprint of the anchor bytes, for diagnostics.
    pub fn fingerprint(&self) -> String {
        hash::sha256_hex(&self.raw)
    }
}

/// Single-attempt blocking fetch of the root certificate. A failed fetch is
/// immediately fatal; there is no retry loop.
fn fetch_root_certificate() -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(APPLE_ROOT_CA_URL)
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            Error::TrustAnchorUnavailable(format!("fetching {APPLE_ROOT_CA_URL}: {e}"))
        })?;
    let body = response
        .bytes()
        .map_err(|e| Error::TrustAnchorUnavailable(format!("reading certificate body: {e}")))?;
    if body.is_empty() {
        return Err(Error::TrustAnchorUnavailable(format!(
            "{APPLE_ROOT_CA_URL} returned an empty body"
        )));
    }
    Ok(body.to_vec())
}

/// Write `data` to `path` atomically (temp file in the same directory, then
/// rename into place).
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new()?,
    };
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
