// verify.rs — Profile signature verification
//
// A provisioning profile is a PKCS#7 signed-data envelope with the plist
// payload embedded as signed content. Verification builds a trust store
// containing only the supplied anchor and asks OpenSSL to check both the
// chain of trust and content integrity in one call.
//
// FAIL CLOSED: the payload bytes leave this module only when verification
// succeeds. Parse errors, chain failures, and integrity failures all map to
// the same fatal error, and nothing partial is ever returned.

use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;

use crate::anchor::TrustAnchor;
use crate::error::{Error, Result};

/// Verify `signed` against `anchor` and return the embedded payload bytes.
pub fn verify_profile(signed: &[u8], anchor: &TrustAnchor) -> Result<Vec<u8>> {
    let envelope = Pkcs7::from_der(signed)
        .or_else(|_| Pkcs7::from_pem(signed))
        .map_err(|e| Error::ProfileVerificationFailed(format!("not a PKCS#7 envelope: {e}")))?;

    let store = single_anchor_store(anchor)?;
    let untrusted = Stack::<X509>::new()
        .map_err(|e| Error::ProfileVerificationFailed(format!("building cert stack: {e}")))?;

    let mut payload = Vec::new();
    envelope
        .verify(
            &untrusted,
            &store,
            None,
            Some(&mut payload),
            Pkcs7Flags::empty(),
        )
        .map_err(|e| Error::ProfileVerificationFailed(format!("signature rejected: {e}")))?;

    if payload.is_empty() {
        return Err(Error::ProfileVerificationFailed(
            "verified envelope contains no payload".to_string(),
        ));
    }
    Ok(payload)
}

/// A trust store containing exactly the one anchor certificate.
fn single_anchor_store(anchor: &TrustAnchor) -> Result<openssl::x509::store::X509Store> {
    let mut builder = X509StoreBuilder::new()
        .map_err(|e| Error::ProfileVerificationFailed(format!("building trust store: {e}")))?;
    builder
        .add_cert(anchor.certificate().clone())
        .map_err(|e| Error::ProfileVerificationFailed(format!("adding trust anchor: {e}")))?;
    Ok(builder.build())
}
