use serde::{Deserialize, Serialize};

use super::or_empty;
use crate::{
    error::{IpcError, Result},
    helper,
    request::IpcRequest,
};

/// Card scheme, sent as `CardType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum CardType {
    Mastercard,
    Maestro,
    Visa,
    VisaElectron,
    VPay,
    Jcb,
}

impl CardType {
    pub fn code(self) -> u8 {
        match self {
            CardType::Mastercard => 1,
            CardType::Maestro => 2,
            CardType::Visa => 3,
            CardType::VisaElectron => 4,
            CardType::VPay => 5,
            CardType::Jcb => 6,
        }
    }
}

/// Raw card data or a stored card token.
///
/// PAN, CVC and expiry are encrypted with the gateway encryption key when
/// added to a request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    pub card_type: Option<CardType>,
    pub number: Option<String>,
    pub holder: Option<String>,
    /// Expiry month, `1`..`12`
    pub exp_mm: Option<String>,
    /// Expiry year, two or four digits
    pub exp_yy: Option<String>,
    pub cvc: Option<String>,
    pub eci: Option<String>,
    pub avv: Option<String>,
    pub xid: Option<String>,
    pub token: Option<String>,
}

// Keeps PAN and CVC out of logs.
impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("card_type", &self.card_type)
            .field("holder", &self.holder)
            .field("has_number", &self.number.is_some())
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl Card {
    /// A card referenced by a stored token.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(helper::is_present)
    }

    /// A token card is valid as is. A raw card needs a number, CVC and expiry.
    pub fn validate(&self) -> Result<()> {
        if self.has_token() {
            return Ok(());
        }

        let number = self.number.as_deref().unwrap_or("");
        if !(12..=19).contains(&number.len()) || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(IpcError::validation("Invalid card number"));
        }

        self.validate_secrets()
    }

    /// CVC and expiry checks shared by raw cards and stored card updates.
    pub(crate) fn validate_secrets(&self) -> Result<()> {
        if !self.cvc.as_deref().is_some_and(helper::is_valid_cvc) {
            return Err(IpcError::validation("Invalid card CVC"));
        }

        let month = self
            .exp_mm
            .as_deref()
            .and_then(|m| m.trim().parse::<u8>().ok());
        if !matches!(month, Some(1..=12)) {
            return Err(IpcError::validation("Invalid card expire date (MM)"));
        }

        let year = self.exp_yy.as_deref().unwrap_or("").trim();
        if !matches!(year.len(), 2 | 4) || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(IpcError::validation("Invalid card expire date (YY)"));
        }

        Ok(())
    }

    /// Expiry as `YYMM`.
    pub fn exp_date(&self) -> String {
        let year = self.exp_yy.as_deref().unwrap_or("").trim();
        let year = year.get(year.len().saturating_sub(2)..).unwrap_or(year);
        let month = self.exp_mm.as_deref().unwrap_or("").trim();
        format!("{year:0>2}{month:0>2}")
    }

    pub(crate) fn card_type_code(&self) -> String {
        self.card_type
            .map(|t| t.code().to_string())
            .unwrap_or_default()
    }

    /// Appends the raw card block: CardType, PAN, CardholderName, ExpDate,
    /// CVC, ECI, AVV, XID.
    pub(crate) fn add_raw_to(&self, req: &mut IpcRequest<'_>) -> Result<()> {
        req.add_param("CardType", self.card_type_code());
        req.add_encrypted_param("PAN", or_empty(&self.number))?;
        req.add_param("CardholderName", or_empty(&self.holder));
        req.add_encrypted_param("ExpDate", &self.exp_date())?;
        req.add_encrypted_param("CVC", or_empty(&self.cvc))?;
        self.add_3ds_to(req);
        Ok(())
    }

    pub(crate) fn add_3ds_to(&self, req: &mut IpcRequest<'_>) {
        req.add_param("ECI", or_empty(&self.eci))
            .add_param("AVV", or_empty(&self.avv))
            .add_param("XID", or_empty(&self.xid));
    }
}
