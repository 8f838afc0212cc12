use std::{fmt, fs, path::Path};

use base64::engine::{general_purpose::STANDARD as BASE64, Engine};
use openssl::pkey::{PKey, Private, Public};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    crypto::{self, DigestAlgorithm},
    defines::{DEFAULT_IPC_URL, DEFAULT_LANGUAGE, DEFAULT_VERSION, SDK_VERSION},
    error::{IpcError, Result},
    helper,
};

/// Validated merchant credentials and endpoint settings.
///
/// Built once through [`ConfigBuilder`], then shared read-only by every
/// request. Holds parsed keys only, never the PEM text.
#[derive(Clone)]
pub struct Config {
    private_key: PKey<Private>,
    api_public_key: Option<PKey<Public>>,
    encrypt_public_key: Option<PKey<Public>>,
    key_index: u32,
    sid: String,
    wallet: String,
    lang: String,
    version: String,
    ipc_url: String,
    developer_key: Option<String>,
    source: String,
    digest: DigestAlgorithm,
}

impl Config {
    /// Starts a new builder with protocol defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Store private key used to sign requests.
    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }

    /// Gateway key used to verify responses and notify callbacks.
    pub fn api_public_key(&self) -> Result<&PKey<Public>> {
        self.api_public_key
            .as_ref()
            .ok_or_else(|| IpcError::configuration("Missing IPC API public key"))
    }

    /// Key used to encrypt card fields.
    pub fn encrypt_public_key(&self) -> Result<&PKey<Public>> {
        self.encrypt_public_key
            .as_ref()
            .ok_or_else(|| IpcError::configuration("Missing encryption public key"))
    }

    pub fn key_index(&self) -> u32 {
        self.key_index
    }

    /// Store ID.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Merchant wallet number.
    pub fn wallet(&self) -> &str {
        &self.wallet
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Protocol version sent as `IPCVersion`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn ipc_url(&self) -> &str {
        &self.ipc_url
    }

    pub fn developer_key(&self) -> Option<&str> {
        self.developer_key.as_deref()
    }

    /// Request source tag sent as `Source`.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Digest used for request signatures and response verification.
    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }
}

/// Unvalidated credential bundle.
///
/// Can be filled through setters or deserialized from any serde source.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConfigBuilder {
    private_key: Option<String>,
    api_public_key: Option<String>,
    encrypt_public_key: Option<String>,
    key_index: Option<u32>,
    sid: Option<String>,
    wallet: Option<String>,
    lang: Option<String>,
    version: Option<String>,
    ipc_url: Option<String>,
    developer_key: Option<String>,
    source: Option<String>,
    digest: Option<DigestAlgorithm>,
}

// Key material and the developer key stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sid", &self.sid)
            .field("wallet", &self.wallet)
            .field("key_index", &self.key_index)
            .field("version", &self.version)
            .field("lang", &self.lang)
            .field("ipc_url", &self.ipc_url)
            .field("source", &self.source)
            .field("digest", &self.digest)
            .field("has_api_public_key", &self.api_public_key.is_some())
            .field("has_encrypt_public_key", &self.encrypt_public_key.is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("sid", &self.sid)
            .field("wallet", &self.wallet)
            .field("key_index", &self.key_index)
            .field("version", &self.version)
            .field("lang", &self.lang)
            .field("ipc_url", &self.ipc_url)
            .field("source", &self.source)
            .field("digest", &self.digest)
            .field("has_private_key", &self.private_key.is_some())
            .field("has_api_public_key", &self.api_public_key.is_some())
            .field("has_encrypt_public_key", &self.encrypt_public_key.is_some())
            .finish_non_exhaustive()
    }
}

impl ConfigBuilder {
    /// Store RSA private key in PEM form.
    pub fn private_key(mut self, pem: impl Into<String>) -> Self {
        self.private_key = Some(pem.into());
        self
    }

    /// Reads the store RSA private key from a PEM file.
    pub fn private_key_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let pem = read_pem(path.as_ref(), "Private key")?;
        Ok(self.private_key(pem))
    }

    /// Gateway public key (or certificate) in PEM form.
    pub fn api_public_key(mut self, pem: impl Into<String>) -> Self {
        self.api_public_key = Some(pem.into());
        self
    }

    /// Reads the gateway public key from a PEM file.
    pub fn api_public_key_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let pem = read_pem(path.as_ref(), "Public key")?;
        Ok(self.api_public_key(pem))
    }

    /// Public key used to encrypt sensitive card fields.
    pub fn encrypt_public_key(mut self, pem: impl Into<String>) -> Self {
        self.encrypt_public_key = Some(pem.into());
        self
    }

    pub fn key_index(mut self, key_index: u32) -> Self {
        self.key_index = Some(key_index);
        self
    }

    pub fn sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn wallet(mut self, wallet: impl Into<String>) -> Self {
        self.wallet = Some(wallet.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn ipc_url(mut self, url: impl Into<String>) -> Self {
        self.ipc_url = Some(url.into());
        self
    }

    pub fn developer_key(mut self, key: impl Into<String>) -> Self {
        self.developer_key = Some(key.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = Some(digest);
        self
    }

    /// Applies a configuration package issued by the merchant portal.
    ///
    /// The package is base64-encoded JSON with the keys `sid`, `cn` (wallet),
    /// `pk` (private key), `pc` (gateway public key, also used for encryption)
    /// and `idx` (key index).
    pub fn configuration_package(mut self, package: &str) -> Result<Self> {
        let invalid = || IpcError::configuration("Invalid autogenerated data");

        let decoded = BASE64.decode(package.trim()).map_err(|_| invalid())?;
        let data: Value = serde_json::from_slice(&decoded).map_err(|_| invalid())?;
        let data = data.as_object().filter(|o| !o.is_empty()).ok_or_else(invalid)?;

        for (key, value) in data {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(invalid()),
            };

            match key.as_str() {
                "sid" => self.sid = Some(value),
                "cn" => self.wallet = Some(value),
                "pk" => self.private_key = Some(value),
                "pc" => {
                    self.api_public_key = Some(value.clone());
                    self.encrypt_public_key = Some(value);
                }
                "idx" => {
                    let idx = value.parse().map_err(|_| {
                        IpcError::configuration(format!("Invalid key index in package: {value}"))
                    })?;
                    self.key_index = Some(idx);
                }
                other => {
                    return Err(IpcError::configuration(format!(
                        "Unknown autogenerated authentication data parameter: {other}"
                    )))
                }
            }
        }

        Ok(self)
    }

    /// Validates every field and imports the keys.
    pub fn build(self) -> Result<Config> {
        let key_index = self
            .key_index
            .ok_or_else(|| IpcError::configuration("Invalid Key Index"))?;

        let ipc_url = self.ipc_url.unwrap_or_else(|| DEFAULT_IPC_URL.to_owned());
        if !helper::is_valid_url(&ipc_url) {
            return Err(IpcError::configuration("Invalid IPC URL"));
        }

        let sid = self
            .sid
            .filter(|s| helper::is_present(s))
            .ok_or_else(|| IpcError::configuration("Invalid SID"))?;

        let wallet = self
            .wallet
            .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| IpcError::configuration("Invalid Wallet number"))?;

        let version = self.version.unwrap_or_else(|| DEFAULT_VERSION.to_owned());
        if !helper::is_present(&version) {
            return Err(IpcError::configuration("Invalid IPC Version"));
        }

        let private_key = self
            .private_key
            .as_deref()
            .ok_or_else(|| IpcError::configuration("Invalid Private key"))
            .and_then(crypto::import_private_key)?;

        let api_public_key = self
            .api_public_key
            .as_deref()
            .map(crypto::import_public_key)
            .transpose()?;

        let encrypt_public_key = self
            .encrypt_public_key
            .as_deref()
            .map(crypto::import_public_key)
            .transpose()?;

        let config = Config {
            private_key,
            api_public_key,
            encrypt_public_key,
            key_index,
            sid,
            wallet,
            lang: self.lang.unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            version,
            ipc_url,
            developer_key: self.developer_key,
            source: self
                .source
                .unwrap_or_else(|| format!("SDK_Rust_{SDK_VERSION}")),
            digest: self.digest.unwrap_or_default(),
        };

        log::debug!(
            "Validated IPC config for SID {} (key index {}, {})",
            config.sid,
            config.key_index,
            config.ipc_url
        );

        Ok(config)
    }
}

fn read_pem(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        IpcError::configuration(format!("{what} not found in {}: {e}", path.display()))
    })
}
