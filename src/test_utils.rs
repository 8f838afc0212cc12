use base64::engine::{general_purpose::STANDARD as BASE64, Engine};
use once_cell::sync::Lazy;

use crate::{
    config::Config,
    crypto::{self, DigestAlgorithm},
    signature::signable_string,
};

pub(crate) struct TestKeys {
    pub store_private: String,
    pub store_public: String,
    pub gateway_private: String,
    pub gateway_public: String,
}

pub(crate) static KEYS: Lazy<TestKeys> = Lazy::new(|| {
    let (store_private, store_public) = crypto::generate_key_pair(2048).unwrap();
    let (gateway_private, gateway_public) = crypto::generate_key_pair(2048).unwrap();
    TestKeys {
        store_private,
        store_public,
        gateway_private,
        gateway_public,
    }
});

/// Merchant config trusting the test gateway key for verification and encryption.
pub(crate) fn config() -> Config {
    Config::builder()
        .private_key(KEYS.store_private.clone())
        .api_public_key(KEYS.gateway_public.clone())
        .encrypt_public_key(KEYS.gateway_public.clone())
        .ipc_url("https://www.mypos.eu/vmp/checkout-test")
        .sid("000000000000010")
        .wallet("61938166610")
        .key_index(1)
        .build()
        .unwrap()
}

/// Signs values the way the gateway signs its responses.
pub(crate) fn gateway_sign<S: AsRef<str>>(values: &[S]) -> String {
    let key = crypto::import_private_key(&KEYS.gateway_private).unwrap();
    let signable = signable_string(values);
    let sig = crypto::sign(signable.as_bytes(), &key, DigestAlgorithm::Sha256).unwrap();
    BASE64.encode(sig)
}

/// A signed JSON response with `Signature` appended after `fields`.
pub(crate) fn signed_json(fields: &[(&str, &str)]) -> String {
    let values: Vec<&str> = fields.iter().map(|(_, v)| *v).collect();
    let mut obj = serde_json::Map::new();
    for (k, v) in fields {
        obj.insert((*k).to_owned(), (*v).into());
    }
    obj.insert("Signature".to_owned(), gateway_sign(&values).into());
    serde_json::Value::Object(obj).to_string()
}
