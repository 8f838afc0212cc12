use super::{
    or_empty, require_amount, require_currency, require_output_format, require_text, require_url,
    require_version,
};
use crate::{
    config::Config,
    defines::OutputFormat,
    error::Result,
    helper,
    request::IpcRequest,
    response::Response,
    transport::Transport,
};

/// Hosted pre-authorization page (`IPCPreAuthorization`), delivered as a
/// redirect form.
#[derive(Debug, Clone)]
pub struct PreAuthorization<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub item_name: Option<String>,
    pub amount: Option<f64>,
    pub currency: String,
    pub url_ok: Option<String>,
    pub url_cancel: Option<String>,
    pub url_notify: Option<String>,
    pub note: Option<String>,
}

impl<'a> PreAuthorization<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            item_name: None,
            amount: None,
            currency: "EUR".to_owned(),
            url_ok: None,
            url_cancel: None,
            url_notify: None,
            note: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_version(self.cnf, "IPCPreAuthorization")?;
        require_text(self.item_name.as_deref(), "Empty or invalid item name.")?;
        require_url(self.url_cancel.as_deref(), "Cancel")?;
        require_url(self.url_notify.as_deref(), "Notify")?;
        require_url(self.url_ok.as_deref(), "Success")?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        require_amount(self.amount)?;
        require_currency(&self.currency)
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let amount = require_amount(self.amount)?;
        let mut req = IpcRequest::new(self.cnf, "IPCPreAuthorization");

        req.add_param("ItemName", or_empty(&self.item_name))
            .add_param("Currency", &self.currency)
            .add_param("Amount", helper::format_amount(amount))
            .add_param("OrderID", or_empty(&self.order_id))
            .add_param("URL_OK", or_empty(&self.url_ok))
            .add_param("URL_Cancel", or_empty(&self.url_cancel))
            .add_param("URL_Notify", or_empty(&self.url_notify))
            .add_param("Note", or_empty(&self.note));

        Ok(req)
    }

    pub fn process(&self) -> Result<String> {
        self.validate()?;
        self.build()?.html_redirect()
    }
}

// Completion and cancellation share the same body: OrderID, Amount,
// Currency, OutputFormat.

fn validate_amend(
    cnf: &Config,
    method: &str,
    order_id: Option<&str>,
    amount: Option<f64>,
    currency: &str,
) -> Result<()> {
    require_version(cnf, method)?;
    require_text(order_id, "Invalid OrderId")?;
    require_currency(currency)?;
    require_amount(amount)?;
    Ok(())
}

fn build_amend<'a>(
    cnf: &'a Config,
    method: &str,
    order_id: &Option<String>,
    amount: Option<f64>,
    currency: &str,
    output_format: OutputFormat,
) -> Result<IpcRequest<'a>> {
    let amount = require_amount(amount)?;
    let mut req = IpcRequest::new(cnf, method);

    req.add_param("OrderID", or_empty(order_id))
        .add_param("Amount", helper::format_amount(amount))
        .add_param("Currency", currency)
        .add_output_format(output_format);

    Ok(req)
}

/// Captures a held amount (`IPCPreAuthCompletion`).
#[derive(Debug, Clone)]
pub struct PreAuthorizationCompletion<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    /// Amount to capture, at most the held amount
    pub amount: Option<f64>,
    pub currency: String,
    pub output_format: OutputFormat,
}

impl<'a> PreAuthorizationCompletion<'a> {
    const METHOD: &'static str = "IPCPreAuthCompletion";

    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            amount: None,
            currency: "EUR".to_owned(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        validate_amend(
            self.cnf,
            Self::METHOD,
            self.order_id.as_deref(),
            self.amount,
            &self.currency,
        )
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        build_amend(
            self.cnf,
            Self::METHOD,
            &self.order_id,
            self.amount,
            &self.currency,
            self.output_format,
        )
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}

/// Releases a held amount (`IPCPreAuthCancellation`).
#[derive(Debug, Clone)]
pub struct PreAuthorizationCancellation<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: String,
    pub output_format: OutputFormat,
}

impl<'a> PreAuthorizationCancellation<'a> {
    const METHOD: &'static str = "IPCPreAuthCancellation";

    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            amount: None,
            currency: "EUR".to_owned(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        validate_amend(
            self.cnf,
            Self::METHOD,
            self.order_id.as_deref(),
            self.amount,
            &self.currency,
        )
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        build_amend(
            self.cnf,
            Self::METHOD,
            &self.order_id,
            self.amount,
            &self.currency,
            self.output_format,
        )
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}

/// Queries a pre-authorization (`IPCPreAuthStatus`).
#[derive(Debug, Clone)]
pub struct PreAuthorizationStatus<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub output_format: OutputFormat,
}

impl<'a> PreAuthorizationStatus<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_version(self.cnf, "IPCPreAuthStatus")?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        Ok(())
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let mut req = IpcRequest::new(self.cnf, "IPCPreAuthStatus");
        req.add_param("OrderID", or_empty(&self.order_id))
            .add_output_format(self.output_format);
        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}
