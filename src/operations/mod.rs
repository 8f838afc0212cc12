//! Gateway operations.
//!
//! Each operation is a plain struct over a borrowed [`Config`]. `validate`
//! runs before anything is signed, `build` lays the fields out in wire order
//! and `process` either renders the redirect page or performs the POST.

mod authorization;
mod card;
mod cart;
mod customer;
mod ia;
mod mandate;
mod preauth;
mod purchase;
mod refund;
mod status;

pub use authorization::{Authorization, AuthorizationList};
pub use card::{Card, CardType};
pub use cart::{Cart, CartItem, ItemType};
pub use customer::Customer;
pub use ia::{CardVerification, IaPreAuthorization, IaPurchase, IaStoredCardUpdate};
pub use mandate::{MandateAction, MandateManagement, RequestMoney};
pub use preauth::{
    PreAuthorization, PreAuthorizationCancellation, PreAuthorizationCompletion,
    PreAuthorizationStatus,
};
pub use purchase::{CardTokenRequest, PaymentMethod, PaymentParametersRequired, Purchase, PurchaseByIcard};
pub use refund::{Refund, Reversal};
pub use status::GetPaymentStatus;

use crate::{
    config::Config,
    defines::OutputFormat,
    error::{IpcError, Result},
    helper,
};

/// Lowest protocol version that knows the authorization family of methods.
const MIN_AUTH_VERSION: &str = "1.4";

fn require_version(cnf: &Config, method: &str) -> Result<()> {
    if helper::version_check(cnf.version(), MIN_AUTH_VERSION) {
        Ok(())
    } else {
        Err(IpcError::validation(format!(
            "IPCVersion {} does not support {method} method. Please use {MIN_AUTH_VERSION} or above.",
            cnf.version()
        )))
    }
}

fn require_url<'v>(url: Option<&'v str>, what: &str) -> Result<&'v str> {
    url.filter(|u| helper::is_valid_url(u))
        .ok_or_else(|| IpcError::validation(format!("Invalid {what} URL")))
}

fn require_amount(amount: Option<f64>) -> Result<f64> {
    amount
        .filter(|a| helper::is_valid_amount(*a))
        .ok_or_else(|| IpcError::validation("Empty or invalid amount"))
}

fn require_currency(currency: &str) -> Result<()> {
    if helper::is_valid_currency(currency) {
        Ok(())
    } else {
        Err(IpcError::validation("Invalid currency"))
    }
}

fn require_text<'v>(value: Option<&'v str>, msg: &str) -> Result<&'v str> {
    value
        .filter(|v| helper::is_present(v))
        .ok_or_else(|| IpcError::validation(msg))
}

/// Direct POST replies come back as JSON or XML only.
fn require_output_format(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Xml => Ok(()),
        OutputFormat::Post => Err(IpcError::validation("Invalid Output format")),
    }
}

/// Unset optional fields are still sent, as empty strings.
fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Prefixes a nested validation error with the part that failed.
fn nested(what: &str, err: IpcError) -> IpcError {
    match err {
        IpcError::Validation(msg) => IpcError::Validation(format!("Invalid {what} details: {msg}")),
        other => other,
    }
}
