//! Direct card operations (`IPCIA*`). Card secrets are encrypted before signing.

use serde::{Deserialize, Serialize};

use super::{
    nested, or_empty, require_amount, require_currency, require_output_format, require_text,
    require_version, Card, Cart,
};
use crate::{
    config::Config,
    defines::OutputFormat,
    error::{IpcError, Result},
    helper,
    request::IpcRequest,
    response::Response,
    transport::Transport,
};

fn require_card(card: Option<&Card>) -> Result<&Card> {
    card.ok_or_else(|| IpcError::validation("Missing card details"))
}

/// Charges a raw card or a stored token (`IPCIAPurchase`).
#[derive(Debug, Clone)]
pub struct IaPurchase<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub currency: String,
    pub card: Option<Card>,
    pub cart: Option<Cart>,
    /// Account for payment settlement
    pub account_settlement: Option<String>,
    pub note: Option<String>,
    pub output_format: OutputFormat,
}

impl<'a> IaPurchase<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            currency: "EUR".to_owned(),
            card: None,
            cart: None,
            account_settlement: None,
            note: None,
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        require_currency(&self.currency)?;

        self.cart
            .as_ref()
            .ok_or_else(|| IpcError::validation("Missing Cart details"))?
            .validate()
            .map_err(|e| nested("Cart", e))?;

        require_card(self.card.as_ref())?
            .validate()
            .map_err(|e| nested("Card", e))
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let cart = self
            .cart
            .as_ref()
            .ok_or_else(|| IpcError::validation("Missing Cart details"))?;
        let card = require_card(self.card.as_ref())?;
        let mut req = IpcRequest::new(self.cnf, "IPCIAPurchase");

        req.add_param("OrderID", or_empty(&self.order_id))
            .add_param("Amount", helper::format_cents(cart.total_cents()))
            .add_param("Currency", &self.currency);

        if card.has_token() {
            req.add_param("CardToken", or_empty(&card.token));
        } else {
            card.add_raw_to(&mut req)?;
        }

        req.add_param("AccountSettlement", or_empty(&self.account_settlement))
            .add_param("Note", or_empty(&self.note))
            .add_output_format(self.output_format);

        cart.add_to(&mut req, &self.currency, false);

        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}

/// Holds funds on a raw card (`IPCIAPreAuthorization`).
#[derive(Debug, Clone)]
pub struct IaPreAuthorization<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub item_name: Option<String>,
    pub amount: Option<f64>,
    pub currency: String,
    pub card: Option<Card>,
    pub note: Option<String>,
    pub output_format: OutputFormat,
}

impl<'a> IaPreAuthorization<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            item_name: None,
            amount: None,
            currency: "EUR".to_owned(),
            card: None,
            note: None,
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_version(self.cnf, "IPCIAPreAuthorization")?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        require_text(self.item_name.as_deref(), "Empty or invalid item name.")?;
        require_currency(&self.currency)?;
        require_amount(self.amount)?;

        let card = require_card(self.card.as_ref())?;
        if card.token.is_some() {
            return Err(IpcError::validation(
                "IPCIAPreAuthorization does not support card token.",
            ));
        }
        card.validate().map_err(|e| nested("Card", e))
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let amount = require_amount(self.amount)?;
        let card = require_card(self.card.as_ref())?;
        let mut req = IpcRequest::new(self.cnf, "IPCIAPreAuthorization");

        req.add_param("OrderID", or_empty(&self.order_id))
            .add_param("ItemName", or_empty(&self.item_name))
            .add_param("Amount", helper::format_amount(amount))
            .add_param("Currency", &self.currency);

        card.add_raw_to(&mut req)?;

        req.add_param("Note", or_empty(&self.note))
            .add_output_format(self.output_format);

        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}

/// Whether a stored card update also verifies the card with a charge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardVerification {
    #[default]
    No,
    Yes,
}

impl CardVerification {
    pub fn code(self) -> u8 {
        match self {
            CardVerification::No => 1,
            CardVerification::Yes => 2,
        }
    }
}

/// Refreshes expiry and CVC of a stored card (`IPCIAStoredCardUpdate`).
#[derive(Debug, Clone)]
pub struct IaStoredCardUpdate<'a> {
    cnf: &'a Config,
    pub card: Option<Card>,
    pub card_verification: CardVerification,
    /// Sent only when verification is requested
    pub amount: Option<f64>,
    pub currency: String,
    pub output_format: OutputFormat,
}

impl<'a> IaStoredCardUpdate<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            card: None,
            card_verification: CardVerification::default(),
            amount: None,
            currency: "EUR".to_owned(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        if self.card_verification == CardVerification::Yes {
            require_amount(self.amount)?;
            require_currency(&self.currency)?;
        }

        let card = require_card(self.card.as_ref())?;
        if !card.has_token() {
            return Err(IpcError::validation("Invalid Card details: missing card token"));
        }
        card.validate_secrets().map_err(|e| nested("Card", e))
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let card = require_card(self.card.as_ref())?;
        let mut req = IpcRequest::new(self.cnf, "IPCIAStoredCardUpdate");

        req.add_param("CardVerification", self.card_verification.code());
        if self.card_verification == CardVerification::Yes {
            req.add_param("Amount", helper::format_amount(require_amount(self.amount)?))
                .add_param("Currency", &self.currency);
        }

        req.add_param("CardType", card.card_type_code())
            .add_param("CardToken", or_empty(&card.token))
            .add_param("CardholderName", or_empty(&card.holder));
        req.add_encrypted_param("ExpDate", &card.exp_date())?;
        req.add_encrypted_param("CVC", or_empty(&card.cvc))?;
        card.add_3ds_to(&mut req);

        req.add_output_format(self.output_format);

        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}
