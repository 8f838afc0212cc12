//! Ordered request builder shared by every operation.
//!
//! [`IpcRequest::new`] writes the common header, operations append their own
//! fields in protocol order, and [`IpcRequest::sign`] freezes the set into a
//! [`SignedRequest`] that can be POSTed or rendered as a redirect form.

use std::fmt::Write as _;

use crate::{
    config::Config,
    defines::{OutputFormat, SIGNATURE_FIELD},
    error::{IpcError, Result},
    helper,
    params::RequestParams,
    response::Response,
    signature::create_signature,
    transport::Transport,
};

/// An unsigned request under construction.
#[derive(Debug)]
pub struct IpcRequest<'a> {
    cnf: &'a Config,
    method: String,
    params: RequestParams,
    output_format: OutputFormat,
}

impl<'a> IpcRequest<'a> {
    /// Starts a request for `method` with the common header fields.
    ///
    /// # Arguments
    ///
    /// * `cnf` - validated merchant configuration
    /// * `method` - gateway method name, e.g. `IPCPurchase`
    pub fn new(cnf: &'a Config, method: impl Into<String>) -> Self {
        let method = method.into();
        let mut params = RequestParams::new();

        params.add("IPCmethod", &method);
        params.add("IPCVersion", cnf.version());
        params.add("IPCLanguage", cnf.lang());
        params.add("SID", cnf.sid());
        params.add("WalletNumber", cnf.wallet());
        params.add("KeyIndex", cnf.key_index());
        params.add("Source", cnf.source());

        Self {
            cnf,
            method,
            params,
            output_format: OutputFormat::default(),
        }
    }

    /// Appends a plain field.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.params.add(name, value);
        self
    }

    /// Appends a field encrypted with the configured encryption key.
    pub fn add_encrypted_param(
        &mut self,
        name: impl Into<String>,
        value: &str,
    ) -> Result<&mut Self> {
        let key = self.cnf.encrypt_public_key()?;
        self.params.add_encrypted(name, value, key)?;
        Ok(self)
    }

    /// Appends the `OutputFormat` field and expects replies in that format.
    pub fn add_output_format(&mut self, format: OutputFormat) -> &mut Self {
        self.output_format = format;
        self.params.add("OutputFormat", format);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// Signs the collected values.
    ///
    /// # Errors
    ///
    /// `Validation` if a field named `Signature` was added by hand, since it
    /// would shadow the appended signature.
    pub fn sign(self) -> Result<SignedRequest<'a>> {
        if self
            .params
            .names()
            .any(|n| n.eq_ignore_ascii_case(SIGNATURE_FIELD))
        {
            return Err(IpcError::validation(
                "Signature is reserved and cannot be added as a parameter",
            ));
        }

        let signature = create_signature(&self.params, self.cnf.private_key(), self.cnf.digest())?;

        log::debug!(
            "Signed {} with {} fields (key index {})",
            self.method,
            self.params.len(),
            self.cnf.key_index()
        );

        Ok(SignedRequest {
            cnf: self.cnf,
            method: self.method,
            params: self.params,
            signature,
            output_format: self.output_format,
        })
    }

    /// Signs and POSTs the request, returning the verified reply.
    pub async fn send_post(self, transport: &dyn Transport) -> Result<Response> {
        self.sign()?.send_post(transport).await
    }

    /// Signs the request and renders the auto-submitting redirect page.
    pub fn html_redirect(self) -> Result<String> {
        Ok(self.sign()?.html_form())
    }
}

/// A frozen, signed request.
#[derive(Debug)]
pub struct SignedRequest<'a> {
    cnf: &'a Config,
    method: String,
    params: RequestParams,
    signature: String,
    output_format: OutputFormat,
}

impl<'a> SignedRequest<'a> {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Base64 signature over the parameter values.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Wire fields in order, `Signature` last.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .chain(std::iter::once((SIGNATURE_FIELD, self.signature.as_str())))
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn form_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields())
            .finish()
    }

    /// HTML page that submits every field to the gateway on load.
    pub fn html_form(&self) -> String {
        let mut html = String::from(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"></head>\n\
             <body onload=\"document.ipcForm.submit();\">\n",
        );

        let _ = writeln!(
            html,
            "<form id=\"ipcForm\" name=\"ipcForm\" action=\"{}\" method=\"post\">",
            helper::escape(self.cnf.ipc_url())
        );

        // plain values are escaped on insertion
        for (name, value) in self.fields() {
            let _ = writeln!(
                html,
                "<input type=\"hidden\" name=\"{}\" value=\"{}\" />",
                helper::escape(name),
                value
            );
        }

        html.push_str("</form>\n</body></html>\n");
        html
    }

    /// POSTs the request and verifies the gateway reply.
    pub async fn send_post(&self, transport: &dyn Transport) -> Result<Response> {
        log::debug!("Sending {} to {}", self.method, self.cnf.ipc_url());

        let raw = transport
            .post_form(self.cnf.ipc_url(), self.form_body())
            .await?;

        Response::new(self.cnf, raw, self.output_format)
    }
}
