use serde::{Deserialize, Serialize};

/// SDK version reported in the `Source` request field.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Production checkout endpoint.
pub const DEFAULT_IPC_URL: &str = "https://www.mypos.eu/vmp/checkout";

/// Test checkout endpoint.
pub const TEST_IPC_URL: &str = "https://www.mypos.eu/vmp/checkout-test";

/// Protocol version assumed when none is configured.
pub const DEFAULT_VERSION: &str = "1.4";

/// Interface language assumed when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Name of the signature field in requests and responses.
pub const SIGNATURE_FIELD: &str = "Signature";

/// Separator placed between values when building the signable string.
pub const SIGNABLE_SEPARATOR: &str = "-";

/// Payload format of a gateway response.
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
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    /// JSON object
    #[default]
    #[strum(serialize = "json")]
    Json,
    /// XML document
    #[strum(serialize = "xml")]
    Xml,
    /// `application/x-www-form-urlencoded` field list (notify callbacks)
    #[strum(serialize = "post")]
    Post,
}

/// Key casing applied when reading verified response fields.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum KeyCase {
    /// Keys as sent by the gateway
    #[default]
    Unchanged,
    /// Keys lower-cased
    Lower,
    /// Keys upper-cased
    Upper,
}

impl KeyCase {
    pub(crate) fn apply(self, key: &str) -> String {
        match self {
            KeyCase::Unchanged => key.to_owned(),
            KeyCase::Lower => key.to_lowercase(),
            KeyCase::Upper => key.to_uppercase(),
        }
    }
}

/// Gateway status codes carried in the `Status` response field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Success,
    MissingRequiredParams,
    SignatureFailed,
    IpcError,
    InvalidSid,
    InvalidParams,
    InvalidReferer,
    TransactionAuthorizationFailed,
    InsufficientFunds,
    /// Any code this SDK does not name
    Other(u32),
}

impl Status {
    /// Parses the textual status value, ignoring leading zeros (`"00"` is success).
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u32>().ok().map(Self::from)
    }

    /// Numeric code of the status.
    pub fn code(self) -> u32 {
        match self {
            Status::Success => 0,
            Status::MissingRequiredParams => 1,
            Status::SignatureFailed => 2,
            Status::IpcError => 3,
            Status::InvalidSid => 4,
            Status::InvalidParams => 5,
            Status::InvalidReferer => 6,
            Status::TransactionAuthorizationFailed => 7,
            Status::InsufficientFunds => 8,
            Status::Other(code) => code,
        }
    }
}

impl From<u32> for Status {
    fn from(code: u32) -> Self {
        match code {
            0 => Status::Success,
            1 => Status::MissingRequiredParams,
            2 => Status::SignatureFailed,
            3 => Status::IpcError,
            4 => Status::InvalidSid,
            5 => Status::InvalidParams,
            6 => Status::InvalidReferer,
            7 => Status::TransactionAuthorizationFailed,
            8 => Status::InsufficientFunds,
            other => Status::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn output_format_names() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::from_str("XML").unwrap(), OutputFormat::Xml);
        assert!(OutputFormat::from_str("yaml").is_err());
    }

    #[test]
    fn status_parse() {
        assert_eq!(Status::parse("00"), Some(Status::Success));
        assert_eq!(Status::parse("3"), Some(Status::IpcError));
        assert_eq!(Status::parse("42").map(Status::code), Some(42));
        assert_eq!(Status::parse("ok"), None);
    }
}
