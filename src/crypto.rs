use openssl::{
    hash::MessageDigest,
    pkey::{Id, PKey, Private, Public},
    rsa::{Padding, Rsa},
    sign::{Signer, Verifier},
    x509::X509,
};
use serde::{Deserialize, Serialize};

use crate::error::{IpcError, Result};

/// Digest used for PKCS#1 v1.5 signatures.
///
/// SHA-256 is the protocol default; the others exist for legacy integrations.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::VariantNames,
)]
#[strum(ascii_case_insensitive)]
pub enum DigestAlgorithm {
    #[serde(alias = "md5")]
    #[strum(serialize = "MD5")]
    Md5,
    #[serde(alias = "sha1")]
    #[strum(serialize = "SHA1")]
    Sha1,
    #[default]
    #[serde(alias = "sha256")]
    #[strum(serialize = "SHA256")]
    Sha256,
    #[serde(alias = "sha384")]
    #[strum(serialize = "SHA384")]
    Sha384,
    #[serde(alias = "sha512")]
    #[strum(serialize = "SHA512")]
    Sha512,
}

impl DigestAlgorithm {
    fn message_digest(self) -> MessageDigest {
        match self {
            DigestAlgorithm::Md5 => MessageDigest::md5(),
            DigestAlgorithm::Sha1 => MessageDigest::sha1(),
            DigestAlgorithm::Sha256 => MessageDigest::sha256(),
            DigestAlgorithm::Sha384 => MessageDigest::sha384(),
            DigestAlgorithm::Sha512 => MessageDigest::sha512(),
        }
    }
}

/// Imports an RSA private key from PEM (PKCS#1 or PKCS#8).
pub fn import_private_key(pem: &str) -> Result<PKey<Private>> {
    let key = PKey::private_key_from_pem(pem.trim().as_bytes())
        .map_err(|e| IpcError::configuration(format!("Invalid private key: {e}")))?;

    ensure_rsa(key.id())?;

    Ok(key)
}

/// Imports an RSA public key from PEM.
///
/// Accepts a SubjectPublicKeyInfo block, a PKCS#1 `RSA PUBLIC KEY` block, or
/// an X.509 certificate, which is how the gateway usually distributes its key.
pub fn import_public_key(pem: &str) -> Result<PKey<Public>> {
    let pem = pem.trim();
    let bytes = pem.as_bytes();

    let key = if pem.contains("BEGIN CERTIFICATE") {
        X509::from_pem(bytes).and_then(|cert| cert.public_key())
    } else if pem.contains("BEGIN RSA PUBLIC KEY") {
        Rsa::public_key_from_pem_pkcs1(bytes).and_then(PKey::from_rsa)
    } else {
        PKey::public_key_from_pem(bytes)
    }
    .map_err(|e| IpcError::configuration(format!("Invalid public key: {e}")))?;

    ensure_rsa(key.id())?;

    Ok(key)
}

fn ensure_rsa(id: Id) -> Result<()> {
    if id != Id::RSA {
        return Err(IpcError::configuration("Key is not an RSA key"));
    }
    Ok(())
}

/// Produces a PKCS#1 v1.5 signature over `data`.
pub fn sign(data: &[u8], key: &PKey<Private>, digest: DigestAlgorithm) -> Result<Vec<u8>> {
    log::trace!("Signing {} bytes with RSA/{digest}", data.len());

    let mut signer = Signer::new(digest.message_digest(), key).map_err(crypto_err)?;
    signer.update(data).map_err(crypto_err)?;
    let sig = signer.sign_to_vec().map_err(crypto_err)?;

    Ok(sig)
}

/// Checks a PKCS#1 v1.5 signature over `data`.
///
/// A malformed signature is reported as `false`, not as an error.
pub fn verify(
    data: &[u8],
    signature: &[u8],
    key: &PKey<Public>,
    digest: DigestAlgorithm,
) -> Result<bool> {
    let mut verifier = Verifier::new(digest.message_digest(), key).map_err(crypto_err)?;
    verifier.update(data).map_err(crypto_err)?;

    let valid = match verifier.verify(signature) {
        Ok(valid) => valid,
        Err(e) => {
            log::trace!("Signature rejected by OpenSSL: {e}");
            false
        }
    };

    Ok(valid)
}

/// Encrypts a single sensitive field with RSA-OAEP.
pub fn encrypt(plaintext: &[u8], key: &PKey<Public>) -> Result<Vec<u8>> {
    let rsa = key.rsa().map_err(crypto_err)?;
    let mut buf = vec![0; rsa.size() as usize];
    let len = rsa
        .public_encrypt(plaintext, &mut buf, Padding::PKCS1_OAEP)
        .map_err(crypto_err)?;
    buf.truncate(len);

    Ok(buf)
}

/// Reverses [`encrypt`].
pub fn decrypt(ciphertext: &[u8], key: &PKey<Private>) -> Result<Vec<u8>> {
    let rsa = key.rsa().map_err(crypto_err)?;
    let mut buf = vec![0; rsa.size() as usize];
    let len = rsa
        .private_decrypt(ciphertext, &mut buf, Padding::PKCS1_OAEP)
        .map_err(crypto_err)?;
    buf.truncate(len);

    Ok(buf)
}

/// Generates a fresh RSA key pair.
///
/// # Returns
///
/// A tuple of the PKCS#1 private key PEM and the SubjectPublicKeyInfo public key PEM.
pub fn generate_key_pair(bits: u32) -> Result<(String, String)> {
    let rsa = Rsa::generate(bits).map_err(crypto_err)?;
    let private_pem = rsa.private_key_to_pem().map_err(crypto_err)?;
    let public_pem = rsa.public_key_to_pem().map_err(crypto_err)?;

    let to_string = |pem: Vec<u8>| {
        String::from_utf8(pem).map_err(|e| IpcError::Crypto(format!("PEM is not UTF-8: {e}")))
    };

    Ok((to_string(private_pem)?, to_string(public_pem)?))
}

/// Derives the public half of a private key.
pub fn public_key_of(key: &PKey<Private>) -> Result<PKey<Public>> {
    let der = key.public_key_to_der().map_err(crypto_err)?;
    PKey::public_key_from_der(&der).map_err(crypto_err)
}

fn crypto_err(e: openssl::error::ErrorStack) -> IpcError {
    IpcError::Crypto(e.to_string())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn key_pair() -> (PKey<Private>, PKey<Public>) {
        let (private_pem, public_pem) = generate_key_pair(2048).unwrap();
        (
            import_private_key(&private_pem).unwrap(),
            import_public_key(&public_pem).unwrap(),
        )
    }

    #[test]
    fn sign_and_verify_all_digests() {
        let (private, public) = key_pair();
        let data = b"MS0y";

        for digest in [
            DigestAlgorithm::Md5,
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            let sig = sign(data, &private, digest).unwrap();
            assert!(verify(data, &sig, &public, digest).unwrap(), "{digest}");
        }
    }

    #[test]
    fn verify_rejects_mutations() {
        let (private, public) = key_pair();
        let data = b"MDAtMTAuMDA=".to_vec();
        let sig = sign(&data, &private, DigestAlgorithm::Sha256).unwrap();

        let mut tampered_data = data.clone();
        tampered_data[0] ^= 0x01;
        assert!(!verify(&tampered_data, &sig, &public, DigestAlgorithm::Sha256).unwrap());

        let mut tampered_sig = sig.clone();
        let last = tampered_sig.len() - 1;
        tampered_sig[last] ^= 0x01;
        assert!(!verify(&data, &tampered_sig, &public, DigestAlgorithm::Sha256).unwrap());

        assert!(!verify(&data, b"short", &public, DigestAlgorithm::Sha256).unwrap());
        assert!(!verify(&data, &sig, &public, DigestAlgorithm::Sha512).unwrap());
    }

    #[test]
    fn verify_with_other_key_fails() {
        let (private, _) = key_pair();
        let (_, other_public) = key_pair();
        let sig = sign(b"data", &private, DigestAlgorithm::Sha256).unwrap();

        assert!(!verify(b"data", &sig, &other_public, DigestAlgorithm::Sha256).unwrap());
    }

    #[test]
    fn encrypt_round_trip() {
        let (private, public) = key_pair();
        let ct = encrypt(b"5555555555554444", &public).unwrap();
        assert_eq!(ct.len(), 256);
        assert_eq!(decrypt(&ct, &private).unwrap(), b"5555555555554444");
    }

    #[test]
    fn import_rejects_garbage() {
        let err = import_private_key("not a key").unwrap_err();
        assert!(matches!(err, IpcError::Configuration(_)));

        let err = import_public_key("-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----")
            .unwrap_err();
        assert!(matches!(err, IpcError::Configuration(_)));
    }

    #[test]
    fn import_pkcs1_public_key() {
        let rsa = Rsa::generate(1024).unwrap();
        let pem = String::from_utf8(rsa.public_key_to_pem_pkcs1().unwrap()).unwrap();
        assert!(pem.contains("BEGIN RSA PUBLIC KEY"));
        assert!(import_public_key(&pem).is_ok());
    }

    #[test]
    fn public_key_of_matches() {
        let (private, _) = key_pair();
        let public = public_key_of(&private).unwrap();
        let sig = sign(b"abc", &private, DigestAlgorithm::Sha256).unwrap();
        assert!(verify(b"abc", &sig, &public, DigestAlgorithm::Sha256).unwrap());
    }

    #[test]
    fn digest_names() {
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Sha256);
        assert_eq!(DigestAlgorithm::from_str("sha512").unwrap(), DigestAlgorithm::Sha512);
        assert_eq!(DigestAlgorithm::Sha1.to_string(), "SHA1");
    }
}
