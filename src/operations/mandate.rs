use serde::{Deserialize, Serialize};

use super::{or_empty, require_amount, require_currency, require_output_format, require_text};
use crate::{
    config::Config,
    defines::OutputFormat,
    error::Result,
    helper,
    request::IpcRequest,
    response::Response,
    transport::Transport,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MandateAction {
    #[default]
    Register,
    Cancel,
}

impl MandateAction {
    pub fn code(self) -> u8 {
        match self {
            MandateAction::Register => 1,
            MandateAction::Cancel => 2,
        }
    }
}

/// Registers or cancels a standing mandate (`IPCMandateManagement`).
#[derive(Debug, Clone)]
pub struct MandateManagement<'a> {
    cnf: &'a Config,
    /// Merchant-chosen mandate identifier
    pub mandate_reference: Option<String>,
    pub customer_wallet_number: Option<String>,
    pub action: MandateAction,
    /// Text shown to the payer when approving the mandate
    pub mandate_text: Option<String>,
    pub output_format: OutputFormat,
}

impl<'a> MandateManagement<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            mandate_reference: None,
            customer_wallet_number: None,
            action: MandateAction::default(),
            mandate_text: None,
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_text(self.mandate_reference.as_deref(), "Invalid MandateReference")?;
        require_text(
            self.customer_wallet_number.as_deref(),
            "Invalid CustomerWalletNumber",
        )?;
        Ok(())
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let mut req = IpcRequest::new(self.cnf, "IPCMandateManagement");
        req.add_param("MandateReference", or_empty(&self.mandate_reference))
            .add_param("CustomerWalletNumber", or_empty(&self.customer_wallet_number))
            .add_param("Action", self.action.code())
            .add_param("MandateText", or_empty(&self.mandate_text))
            .add_output_format(self.output_format);
        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}

/// Pulls funds from a payer wallet under a mandate (`IPCRequestMoney`).
#[derive(Debug, Clone)]
pub struct RequestMoney<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: String,
    pub mandate_reference: Option<String>,
    pub customer_wallet_number: Option<String>,
    /// Marks the transfer as a reversal of an earlier request
    pub reversal_indicator: bool,
    pub reason: Option<String>,
    pub output_format: OutputFormat,
}

impl<'a> RequestMoney<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            amount: None,
            currency: "EUR".to_owned(),
            mandate_reference: None,
            customer_wallet_number: None,
            reversal_indicator: false,
            reason: None,
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_amount(self.amount)?;
        require_currency(&self.currency)?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        Ok(())
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let amount = require_amount(self.amount)?;
        let mut req = IpcRequest::new(self.cnf, "IPCRequestMoney");

        req.add_param("Currency", &self.currency)
            .add_param("Amount", helper::format_amount(amount))
            .add_param("OrderID", or_empty(&self.order_id))
            .add_param("MandateReference", or_empty(&self.mandate_reference))
            .add_param("CustomerWalletNumber", or_empty(&self.customer_wallet_number))
            .add_param("ReversalIndicator", u8::from(self.reversal_indicator))
            .add_param("Reason", or_empty(&self.reason))
            .add_output_format(self.output_format);

        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}
