use serde::{Deserialize, Serialize};

use super::{nested, or_empty, require_currency, require_text, require_url, Cart, Customer};
use crate::{
    config::Config,
    error::{IpcError, Result},
    helper,
    request::IpcRequest,
};

/// Whether the payment page should also store the card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardTokenRequest {
    #[default]
    None,
    /// Store the card without charging it
    OnlyStore,
    PayAndStore,
}

impl CardTokenRequest {
    pub fn code(self) -> u8 {
        match self {
            CardTokenRequest::None => 0,
            CardTokenRequest::OnlyStore => 1,
            CardTokenRequest::PayAndStore => 2,
        }
    }
}

/// How much of the payer's details the payment page asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentParametersRequired {
    /// Merchant supplies full customer details
    #[default]
    Full,
    SimplifiedCall,
    /// Page collects the details itself, customer fields are not sent
    SimplifiedPaymentPage,
}

impl PaymentParametersRequired {
    pub fn code(self) -> u8 {
        match self {
            PaymentParametersRequired::Full => 1,
            PaymentParametersRequired::SimplifiedCall => 2,
            PaymentParametersRequired::SimplifiedPaymentPage => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Standard,
    Ideal,
    #[default]
    Both,
}

impl PaymentMethod {
    pub fn code(self) -> u8 {
        match self {
            PaymentMethod::Standard => 1,
            PaymentMethod::Ideal => 2,
            PaymentMethod::Both => 3,
        }
    }
}

/// Hosted checkout (`IPCPurchase`), delivered as a redirect form.
#[derive(Debug, Clone)]
pub struct Purchase<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub currency: String,
    pub url_ok: Option<String>,
    pub url_cancel: Option<String>,
    pub url_notify: Option<String>,
    pub note: Option<String>,
    pub cart: Option<Cart>,
    pub customer: Option<Customer>,
    pub card_token_request: CardTokenRequest,
    pub payment_parameters_required: PaymentParametersRequired,
    pub payment_method: PaymentMethod,
}

impl<'a> Purchase<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            currency: "EUR".to_owned(),
            url_ok: None,
            url_cancel: None,
            url_notify: None,
            note: None,
            cart: None,
            customer: None,
            card_token_request: CardTokenRequest::default(),
            payment_parameters_required: PaymentParametersRequired::default(),
            payment_method: PaymentMethod::default(),
        }
    }

    /// A card-store-only request carries neither amount nor cart.
    fn charges(&self) -> bool {
        self.card_token_request != CardTokenRequest::OnlyStore
    }

    pub fn validate(&self) -> Result<()> {
        require_url(self.url_cancel.as_deref(), "Cancel")?;
        require_url(self.url_notify.as_deref(), "Notify")?;
        require_url(self.url_ok.as_deref(), "Success")?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        require_currency(&self.currency)?;

        if self.charges() {
            self.cart
                .as_ref()
                .ok_or_else(|| IpcError::validation("Missing Cart details"))?
                .validate()
                .map_err(|e| nested("Cart", e))?;
        }

        if self.payment_parameters_required == PaymentParametersRequired::Full {
            self.customer
                .as_ref()
                .ok_or_else(|| IpcError::validation("Customer details not set!"))?
                .validate()
                .map_err(|e| nested("Customer", e))?;
        }

        Ok(())
    }

    /// Lays out the request fields. Does not validate.
    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let mut req = IpcRequest::new(self.cnf, "IPCPurchase");
        let cart = self.cart.as_ref().filter(|_| self.charges());

        req.add_param("Currency", &self.currency);
        if let Some(cart) = cart {
            req.add_param("Amount", helper::format_cents(cart.total_cents()));
        }

        req.add_param("OrderID", or_empty(&self.order_id))
            .add_param("URL_OK", or_empty(&self.url_ok))
            .add_param("URL_Cancel", or_empty(&self.url_cancel))
            .add_param("URL_Notify", or_empty(&self.url_notify))
            .add_param("Note", or_empty(&self.note));

        if self.payment_parameters_required != PaymentParametersRequired::SimplifiedPaymentPage {
            self.customer
                .clone()
                .unwrap_or_default()
                .add_to(&mut req);
        }

        if let Some(cart) = cart {
            cart.add_to(&mut req, &self.currency, true);
        }

        req.add_param("CardTokenRequest", self.card_token_request.code())
            .add_param(
                "PaymentParametersRequired",
                self.payment_parameters_required.code(),
            )
            .add_param("PaymentMethod", self.payment_method.code());

        Ok(req)
    }

    /// Validates, signs and renders the auto-submitting checkout page.
    pub fn process(&self) -> Result<String> {
        self.validate()?;
        self.build()?.html_redirect()
    }
}

/// Checkout paid from an iCard wallet (`IPCPurchaseByIcard`).
#[derive(Debug, Clone)]
pub struct PurchaseByIcard<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub currency: String,
    pub url_ok: Option<String>,
    pub url_cancel: Option<String>,
    pub url_notify: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cart: Option<Cart>,
}

impl<'a> PurchaseByIcard<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            currency: "EUR".to_owned(),
            url_ok: None,
            url_cancel: None,
            url_notify: None,
            email: None,
            phone: None,
            cart: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_url(self.url_cancel.as_deref(), "Cancel")?;
        require_url(self.url_notify.as_deref(), "Notify")?;
        require_url(self.url_ok.as_deref(), "Success")?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        require_currency(&self.currency)?;

        if self.email.is_none() && self.phone.is_none() {
            return Err(IpcError::validation(
                "Must provide customer email either phone",
            ));
        }
        if let Some(email) = &self.email {
            if !helper::is_valid_email(email) {
                return Err(IpcError::validation("Invalid Email"));
            }
        }

        self.cart
            .as_ref()
            .ok_or_else(|| IpcError::validation("Missing Cart details"))?
            .validate()
            .map_err(|e| nested("Cart", e))
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let cart = self
            .cart
            .as_ref()
            .ok_or_else(|| IpcError::validation("Missing Cart details"))?;
        let mut req = IpcRequest::new(self.cnf, "IPCPurchaseByIcard");

        req.add_param("Currency", &self.currency)
            .add_param("Amount", helper::format_cents(cart.total_cents()))
            .add_param("OrderID", or_empty(&self.order_id))
            .add_param("URL_OK", or_empty(&self.url_ok))
            .add_param("URL_Cancel", or_empty(&self.url_cancel))
            .add_param("URL_Notify", or_empty(&self.url_notify))
            .add_param("CustomerEmail", or_empty(&self.email))
            .add_param("CustomerPhone", or_empty(&self.phone));

        cart.add_to(&mut req, &self.currency, false);

        Ok(req)
    }

    pub fn process(&self) -> Result<String> {
        self.validate()?;
        self.build()?.html_redirect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{operations::ItemType, test_utils::config};

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add("Book", 2, 10.0, ItemType::Article).unwrap();
        cart
    }

    fn purchase(cnf: &Config) -> Purchase<'_> {
        let mut p = Purchase::new(cnf);
        p.order_id = Some("ORDER-1".into());
        p.url_ok = Some("https://shop.example/ok".into());
        p.url_cancel = Some("https://shop.example/cancel".into());
        p.url_notify = Some("https://shop.example/notify".into());
        p.cart = Some(cart());
        p.customer = Some(Customer {
            email: Some("john@example.com".into()),
            first_name: Some("John".into()),
            last_name: Some("Smith".into()),
            ..Default::default()
        });
        p
    }

    fn names(req: &IpcRequest<'_>) -> Vec<String> {
        req.params().names().skip(7).map(str::to_owned).collect()
    }

    #[test]
    fn full_purchase_field_order() {
        let cnf = config();
        let req = purchase(&cnf).build().unwrap();

        assert_eq!(
            names(&req),
            [
                "Currency",
                "Amount",
                "OrderID",
                "URL_OK",
                "URL_Cancel",
                "URL_Notify",
                "Note",
                "customeremail",
                "customerphone",
                "customerfirstnames",
                "customerfamilyname",
                "customercountry",
                "customercity",
                "customerzipcode",
                "customeraddress",
                "CartItems",
                "Article_1",
                "Quantity_1",
                "Price_1",
                "Amount_1",
                "Currency_1",
                "CardTokenRequest",
                "PaymentParametersRequired",
                "PaymentMethod",
            ]
        );
        assert_eq!(req.params().get("Amount"), Some("20.00"));
        assert_eq!(req.params().get("Note"), Some(""));
        assert_eq!(req.params().get("PaymentMethod"), Some("3"));
    }

    #[test]
    fn card_store_only_skips_amount_and_cart() {
        let cnf = config();
        let mut p = purchase(&cnf);
        p.cart = None;
        p.card_token_request = CardTokenRequest::OnlyStore;
        p.payment_parameters_required = PaymentParametersRequired::SimplifiedPaymentPage;

        p.validate().unwrap();
        let req = p.build().unwrap();
        let names = names(&req);
        assert!(!names.iter().any(|n| n == "Amount" || n == "CartItems"));
        assert!(!names.iter().any(|n| n.starts_with("customer")));
        assert_eq!(req.params().get("CardTokenRequest"), Some("1"));
    }

    #[test]
    fn validation_runs_before_signing() {
        let cnf = config();

        let mut p = purchase(&cnf);
        p.url_notify = Some("notify".into());
        assert_eq!(
            p.process().unwrap_err(),
            IpcError::Validation("Invalid Notify URL".into())
        );

        let mut p = purchase(&cnf);
        p.cart = Some(Cart::new());
        assert_eq!(
            p.validate().unwrap_err(),
            IpcError::Validation("Invalid Cart details: Missing cart items".into())
        );

        let mut p = purchase(&cnf);
        p.customer = None;
        assert!(p.validate().is_err());
        p.payment_parameters_required = PaymentParametersRequired::SimplifiedCall;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn process_renders_form() {
        let cnf = config();
        let html = purchase(&cnf).process().unwrap();
        assert!(html.contains("name=\"IPCmethod\" value=\"IPCPurchase\""));
        assert!(html.contains("name=\"Signature\""));
    }

    #[test]
    fn icard_requires_contact() {
        let cnf = config();
        let mut p = PurchaseByIcard::new(&cnf);
        p.order_id = Some("ORDER-2".into());
        p.url_ok = Some("https://shop.example/ok".into());
        p.url_cancel = Some("https://shop.example/cancel".into());
        p.url_notify = Some("https://shop.example/notify".into());
        p.cart = Some(cart());

        assert_eq!(
            p.validate().unwrap_err(),
            IpcError::Validation("Must provide customer email either phone".into())
        );

        p.phone = Some("+359888000000".into());
        p.validate().unwrap();

        let req = p.build().unwrap();
        assert_eq!(
            names(&req)[..9],
            [
                "Currency",
                "Amount",
                "OrderID",
                "URL_OK",
                "URL_Cancel",
                "URL_Notify",
                "CustomerEmail",
                "CustomerPhone",
                "CartItems",
            ]
        );
    }
}
