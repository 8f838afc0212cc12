//! Canonical signable string and detached request/response signatures.
//!
//! The signable string is `base64(v1 "-" v2 "-" ... vn)` over the values in
//! insertion order. Field names are not covered, and a `-` inside a value is
//! not escaped, so `["a-b"]` and `["a", "b"]` share a signable string.

use base64::engine::{general_purpose::STANDARD as BASE64, Engine};
use openssl::pkey::{PKey, Private, Public};

use crate::{
    crypto::{self, DigestAlgorithm},
    defines::SIGNABLE_SEPARATOR,
    error::{IpcError, Result},
    params::RequestParams,
};

/// Builds the signable string from ordered values.
pub fn signable_string<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = values
        .into_iter()
        .map(|v| v.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(SIGNABLE_SEPARATOR);

    BASE64.encode(joined)
}

/// Signs the parameter values and returns the base64 signature.
///
/// Fails on an empty set: there is nothing the gateway could authenticate.
pub fn create_signature(
    params: &RequestParams,
    key: &PKey<Private>,
    digest: DigestAlgorithm,
) -> Result<String> {
    if params.is_empty() {
        return Err(IpcError::validation("No data to sign"));
    }

    let signable = signable_string(params.values());
    log::trace!("Signing {} request values", params.len());

    let sig = crypto::sign(signable.as_bytes(), key, digest)?;

    Ok(BASE64.encode(sig))
}

/// Checks a base64 signature against ordered values.
///
/// A signature that is not valid base64 verifies as `false`.
pub fn verify_signature<I, S>(
    values: I,
    signature: &str,
    key: &PKey<Public>,
    digest: DigestAlgorithm,
) -> Result<bool>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Ok(sig) = BASE64.decode(signature.trim()) else {
        log::debug!("Signature is not valid base64");
        return Ok(false);
    };

    let signable = signable_string(values);

    crypto::verify(signable.as_bytes(), &sig, key, digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::KEYS;

    fn keys() -> (PKey<Private>, PKey<Public>) {
        (
            crypto::import_private_key(&KEYS.store_private).unwrap(),
            crypto::import_public_key(&KEYS.store_public).unwrap(),
        )
    }

    fn params(pairs: &[(&str, &str)]) -> RequestParams {
        let mut params = RequestParams::new();
        for (k, v) in pairs {
            params.add(*k, *v);
        }
        params
    }

    #[test]
    fn signable_string_joins_values() {
        assert_eq!(signable_string(["1", "2"]), BASE64.encode("1-2"));
        assert_eq!(signable_string(["00", "10.00"]), BASE64.encode("00-10.00"));
        assert_eq!(signable_string(Vec::<String>::new()), "");
    }

    #[test]
    fn separator_inside_values_is_not_escaped() {
        assert_eq!(signable_string(["a-b"]), signable_string(["a", "b"]));
    }

    #[test]
    fn sign_then_verify() {
        let (private, public) = keys();
        let p = params(&[("A", "1"), ("B", "2")]);

        let sig = create_signature(&p, &private, DigestAlgorithm::Sha256).unwrap();

        assert!(verify_signature(["1", "2"], &sig, &public, DigestAlgorithm::Sha256).unwrap());
        assert!(!verify_signature(["1", "3"], &sig, &public, DigestAlgorithm::Sha256).unwrap());

        let other = crypto::import_public_key(&KEYS.gateway_public).unwrap();
        assert!(!verify_signature(["1", "2"], &sig, &other, DigestAlgorithm::Sha256).unwrap());
    }

    #[test]
    fn order_changes_signature() {
        let (private, _) = keys();
        let ab = params(&[("A", "1"), ("B", "2")]);
        let ba = params(&[("B", "2"), ("A", "1")]);

        assert_ne!(
            signable_string(ab.values()),
            signable_string(ba.values())
        );
        assert_ne!(
            create_signature(&ab, &private, DigestAlgorithm::Sha256).unwrap(),
            create_signature(&ba, &private, DigestAlgorithm::Sha256).unwrap()
        );
    }

    #[test]
    fn names_are_not_signed() {
        let (private, _) = keys();
        let a = params(&[("A", "1"), ("B", "2")]);
        let b = params(&[("X", "1"), ("Y", "2")]);

        assert_eq!(
            create_signature(&a, &private, DigestAlgorithm::Sha256).unwrap(),
            create_signature(&b, &private, DigestAlgorithm::Sha256).unwrap()
        );
    }

    #[test]
    fn empty_set_is_rejected() {
        let (private, _) = keys();
        let err = create_signature(&RequestParams::new(), &private, DigestAlgorithm::Sha256)
            .unwrap_err();
        assert_eq!(err, IpcError::Validation("No data to sign".into()));
    }

    #[test]
    fn garbage_signature_is_false() {
        let (_, public) = keys();
        assert!(!verify_signature(["1"], "%%not-base64%%", &public, DigestAlgorithm::Sha256).unwrap());
    }
}
