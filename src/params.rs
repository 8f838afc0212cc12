use base64::engine::{general_purpose::STANDARD as BASE64, Engine};
use indexmap::IndexMap;
use openssl::pkey::{PKey, Public};

use crate::{crypto, error::Result, helper};

/// Ordered request parameters.
///
/// Insertion order is part of the wire contract: the signature covers the
/// values in the order they were added. Re-adding a name replaces its value
/// without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: IndexMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain value, HTML-escaped for safe use inside a form field.
    pub fn add(&mut self, name: impl Into<String>, value: impl ToString) {
        let value = helper::escape(&value.to_string());
        self.params.insert(name.into(), value);
    }

    /// Adds a value as `base64(RSA-OAEP(value))`.
    ///
    /// Reserved for card PAN, CVC and expiry.
    pub fn add_encrypted(
        &mut self,
        name: impl Into<String>,
        value: &str,
        key: &PKey<Public>,
    ) -> Result<()> {
        let ciphertext = crypto::encrypt(value.as_bytes(), key)?;
        self.params.insert(name.into(), BASE64.encode(ciphertext));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Name/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.params.values().map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::KEYS;

    #[test]
    fn preserves_insertion_order() {
        let mut params = RequestParams::new();
        params.add("B", "2");
        params.add("A", 1);
        params.add("C", 3.5);

        assert_eq!(params.names().collect::<Vec<_>>(), ["B", "A", "C"]);
        assert_eq!(params.values().collect::<Vec<_>>(), ["2", "1", "3.5"]);
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut params = RequestParams::new();
        params.add("A", "1");
        params.add("B", "2");
        params.add("C", "3");
        params.add("A", "9");

        assert_eq!(params.len(), 3);
        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            [("A", "9"), ("B", "2"), ("C", "3")]
        );
    }

    #[test]
    fn plain_values_are_escaped() {
        let mut params = RequestParams::new();
        params.add("Note", "<b>Tom & Jerry</b>");
        assert_eq!(params.get("Note"), Some("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
    }

    #[test]
    fn encrypted_values_decrypt_with_private_key() {
        let gateway_private = crypto::import_private_key(&KEYS.gateway_private).unwrap();
        let gateway_public = crypto::import_public_key(&KEYS.gateway_public).unwrap();

        let mut params = RequestParams::new();
        params
            .add_encrypted("PAN", "5555555555554444", &gateway_public)
            .unwrap();

        let stored = params.get("PAN").unwrap();
        assert_ne!(stored, "5555555555554444");

        let ciphertext = BASE64.decode(stored).unwrap();
        let plaintext = crypto::decrypt(&ciphertext, &gateway_private).unwrap();
        assert_eq!(plaintext, b"5555555555554444");
    }
}
