//! Gateway reply parsing and signature verification.
//!
//! A [`Response`] only exists once its signature verified, so any instance a
//! caller holds is safe to read.

#[cfg(feature = "xml")]
mod xml;

use serde_json::{Map, Value};

use crate::{
    config::Config,
    defines::{KeyCase, OutputFormat, Status, SIGNATURE_FIELD},
    error::{IpcError, Result},
    signature::verify_signature,
};

/// A verified gateway reply.
#[derive(Debug, Clone)]
pub struct Response {
    format: OutputFormat,
    raw: String,
    data: Map<String, Value>,
    signature: String,
}

impl Response {
    /// Parses `raw` in the given format and verifies its signature.
    ///
    /// # Errors
    ///
    /// * `InvalidResponse` when the payload is empty or does not parse.
    /// * `Gateway` for an unsigned general error envelope.
    /// * `MissingSignature` for any other unsigned payload.
    /// * `SignatureCheckFailed` when the signature does not match.
    pub fn new(cnf: &Config, raw: impl Into<String>, format: OutputFormat) -> Result<Self> {
        let raw = raw.into();

        if raw.trim().is_empty() {
            return Err(IpcError::InvalidResponse("Invalid Response data".into()));
        }

        let data = parse(&raw, format)?;

        Self::verified(cnf, raw, format, data)
    }

    /// Verifies a notify callback body (`application/x-www-form-urlencoded`).
    pub fn from_notify(cnf: &Config, body: &str) -> Result<Self> {
        Self::new(cnf, body, OutputFormat::Post)
    }

    /// Verifies fields that a web framework already decoded, in received order.
    pub fn from_fields<I, K, V>(cnf: &Config, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data: Map<String, Value> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();

        let raw = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(data.iter().map(|(k, v)| (k.as_str(), v.as_str().unwrap_or(""))))
            .finish();

        Self::verified(cnf, raw, OutputFormat::Post, data)
    }

    /// Non-failing check of a raw payload.
    pub fn is_signature_correct(cnf: &Config, raw: &str, format: OutputFormat) -> bool {
        Self::new(cnf, raw, format).is_ok()
    }

    fn verified(
        cnf: &Config,
        raw: String,
        format: OutputFormat,
        mut data: Map<String, Value>,
    ) -> Result<Self> {
        if data.is_empty() {
            return Err(IpcError::InvalidResponse("No IPC Response!".into()));
        }

        let signature = extract_signature(&mut data);

        let Some(signature) = signature else {
            let status = find(&data, "Status").and_then(|v| Status::parse(&value_text(v)));
            if status == Some(Status::IpcError) {
                let msg = find(&data, "StatusMsg")
                    .map(value_text)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "IPC Response - General Error!".to_owned());
                log::warn!("Unsigned general error from IPC: {msg}");
                return Err(IpcError::Gateway(msg));
            }
            return Err(IpcError::MissingSignature);
        };

        let values = signed_values(&data);
        let key = cnf.api_public_key()?;

        if !verify_signature(&values, &signature, key, cnf.digest())? {
            log::debug!("Response signature check failed over {} values", values.len());
            return Err(IpcError::SignatureCheckFailed);
        }

        log::debug!("Verified {format} response with {} fields", data.len());

        Ok(Self {
            format,
            raw,
            data,
            signature,
        })
    }

    /// Verified fields, with top-level keys cased as requested.
    pub fn data(&self, case: KeyCase) -> Map<String, Value> {
        self.data
            .iter()
            .map(|(k, v)| (case.apply(k), v.clone()))
            .collect()
    }

    /// Field lookup, case-insensitive on the key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        find(&self.data, key)
    }

    /// Field lookup rendered as text.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).map(value_text)
    }

    /// Parsed `Status` field.
    pub fn status(&self) -> Option<Status> {
        self.get_text("Status").and_then(|s| Status::parse(&s))
    }

    /// `StatusMsg` field.
    pub fn status_msg(&self) -> Option<String> {
        self.get_text("StatusMsg")
    }

    /// Whether the gateway reported success. A declined payment is a verified
    /// response with a non-success status, not an error.
    pub fn is_success(&self) -> bool {
        self.status() == Some(Status::Success)
    }

    /// The detached signature that verified this response.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Payload exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn parse(raw: &str, format: OutputFormat) -> Result<Map<String, Value>> {
    match format {
        OutputFormat::Json => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(IpcError::InvalidResponse(
                "JSON response is not an object".into(),
            )),
            Err(e) => Err(IpcError::InvalidResponse(format!("Malformed JSON: {e}"))),
        },
        #[cfg(feature = "xml")]
        OutputFormat::Xml => xml::parse(raw),
        #[cfg(not(feature = "xml"))]
        OutputFormat::Xml => Err(IpcError::InvalidResponse(
            "XML responses require the `xml` feature".into(),
        )),
        OutputFormat::Post => {
            let raw = raw.trim();
            // every non-empty pair needs a `=`, even with an empty value
            if raw.split('&').any(|pair| !pair.is_empty() && !pair.contains('=')) {
                return Err(IpcError::InvalidResponse("Malformed form body".into()));
            }
            Ok(form_urlencoded::parse(raw.as_bytes())
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect())
        }
    }
}

/// Removes the signature field (any casing), keeping the order of the rest.
fn extract_signature(data: &mut Map<String, Value>) -> Option<String> {
    let key = data
        .keys()
        .find(|k| k.eq_ignore_ascii_case(SIGNATURE_FIELD))?
        .clone();

    let taken = std::mem::take(data);
    let mut signature = None;
    *data = taken
        .into_iter()
        .filter_map(|(k, v)| {
            if k == key {
                signature = Some(value_text(&v));
                None
            } else {
                Some((k, v))
            }
        })
        .collect();

    signature.filter(|s| !s.is_empty())
}

fn find<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    data.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

/// Values covered by the response signature, depth first.
fn signed_values(data: &Map<String, Value>) -> Vec<String> {
    let mut out = Vec::with_capacity(data.len());
    for value in data.values() {
        flatten(value, &mut out);
    }
    out
}

fn flatten(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| flatten(v, out)),
        Value::Object(map) => map.values().for_each(|v| flatten(v, out)),
        scalar => out.push(value_text(scalar)),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_owned(),
        Value::Bool(false) | Value::Null => String::new(),
        nested => {
            let mut parts = Vec::new();
            flatten(nested, &mut parts);
            parts.join(crate::defines::SIGNABLE_SEPARATOR)
        }
    }
}
