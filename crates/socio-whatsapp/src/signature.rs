// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `x-hub-signature-256` verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header Meta signs webhook deliveries with.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Outcome of checking a webhook body against its signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCheck {
    Verified,
    /// No app secret configured; the body was not checked.
    Skipped,
    Rejected(&'static str),
}

impl SignatureCheck {
    /// True unless the signature was checked and failed.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, SignatureCheck::Rejected(_))
    }
}

/// Checks `header` (`sha256=<hex>`) against an HMAC-SHA256 of the raw `body`.
///
/// The comparison is constant-time. With no `app_secret` the check is
/// skipped and the caller decides whether to warn.
pub fn verify_signature(app_secret: Option<&str>, body: &[u8], header: Option<&str>) -> SignatureCheck {
    let Some(secret) = app_secret.filter(|s| !s.is_empty()) else {
        return SignatureCheck::Skipped;
    };
    let Some(header) = header else {
        return SignatureCheck::Rejected("missing signature header");
    };
    let Some(hex_sig) = header.trim().strip_prefix("sha256=") else {
        return SignatureCheck::Rejected("signature header lacks sha256= prefix");
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return SignatureCheck::Rejected("signature is not valid hex");
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return SignatureCheck::Rejected("unusable app secret");
    };
    mac.update(body);
    match mac.verify_slice(&expected) {
        Ok(()) => SignatureCheck::Verified,
        Err(_) => SignatureCheck::Rejected("signature mismatch"),
    }
}

/// `sha256=<hex>` header value for `body`. Used by tests and local tooling.
pub fn sign(app_secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"object":"whatsapp_business_account","entry":[]}"#;

    #[test]
    fn valid_signature_is_verified() {
        let header = sign("app-secret", BODY);
        assert_eq!(
            verify_signature(Some("app-secret"), BODY, Some(&header)),
            SignatureCheck::Verified
        );
    }

    #[test]
    fn verification_is_repeatable() {
        let header = sign("app-secret", BODY);
        let first = verify_signature(Some("app-secret"), BODY, Some(&header));
        let second = verify_signature(Some("app-secret"), BODY, Some(&header));
        assert_eq!(first, second);
    }

    #[test]
    fn tampered_body_is_rejected() {
        let header = sign("app-secret", BODY);
        let check = verify_signature(Some("app-secret"), b"{}", Some(&header));
        assert_eq!(check, SignatureCheck::Rejected("signature mismatch"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = sign("other", BODY);
        assert!(!verify_signature(Some("app-secret"), BODY, Some(&header)).is_accepted());
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(!verify_signature(Some("s"), BODY, None).is_accepted());
        assert!(!verify_signature(Some("s"), BODY, Some("md5=abcd")).is_accepted());
        assert!(!verify_signature(Some("s"), BODY, Some("sha256=zz")).is_accepted());
    }

    #[test]
    fn missing_secret_skips() {
        assert_eq!(verify_signature(None, BODY, None), SignatureCheck::Skipped);
        assert_eq!(verify_signature(Some(""), BODY, Some("sha256=00")), SignatureCheck::Skipped);
        assert!(SignatureCheck::Skipped.is_accepted());
    }
}
