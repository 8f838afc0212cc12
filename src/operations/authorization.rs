use super::{
    nested, or_empty, require_amount, require_currency, require_output_format, require_text,
    require_version, Card,
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

/// Holds funds on a stored card (`IPCAuthorization`). Token cards only.
#[derive(Debug, Clone)]
pub struct Authorization<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub item_name: Option<String>,
    pub amount: Option<f64>,
    pub currency: String,
    pub card: Option<Card>,
    pub note: Option<String>,
    pub output_format: OutputFormat,
}

impl<'a> Authorization<'a> {
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
        require_version(self.cnf, "IPCAuthorization")?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        require_text(self.item_name.as_deref(), "Empty or invalid item name")?;
        require_currency(&self.currency)?;
        require_amount(self.amount)?;

        let card = self
            .card
            .as_ref()
            .ok_or_else(|| IpcError::validation("Missing card details"))?;
        if card.number.is_some() || !card.has_token() {
            return Err(IpcError::validation(
                "IPCAuthorization supports only card token",
            ));
        }
        card.validate().map_err(|e| nested("Card", e))
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let amount = require_amount(self.amount)?;
        let token = self.card.as_ref().and_then(|c| c.token.clone());
        let mut req = IpcRequest::new(self.cnf, "IPCAuthorization");

        req.add_param("OrderID", or_empty(&self.order_id))
            .add_param("ItemName", or_empty(&self.item_name))
            .add_param("Amount", helper::format_amount(amount))
            .add_param("Currency", &self.currency)
            .add_param("CardToken", or_empty(&token))
            .add_param("Note", or_empty(&self.note))
            .add_output_format(self.output_format);

        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}

/// Lists open authorizations (`IPCAuthorizationList`).
#[derive(Debug, Clone)]
pub struct AuthorizationList<'a> {
    cnf: &'a Config,
    pub output_format: OutputFormat,
}

impl<'a> AuthorizationList<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_version(self.cnf, "IPCAuthorizationList")
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let mut req = IpcRequest::new(self.cnf, "IPCAuthorizationList");
        req.add_output_format(self.output_format);
        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::config;

    #[test]
    fn authorization_is_token_only() {
        let cnf = config();
        let mut auth = Authorization::new(&cnf);
        auth.order_id = Some("ORDER-1".into());
        auth.item_name = Some("Room".into());
        auth.amount = Some(120.0);
        auth.card = Some(Card {
            number: Some("4111111111111111".into()),
            ..Card::from_token("tok_1")
        });

        assert_eq!(
            auth.validate().unwrap_err(),
            IpcError::Validation("IPCAuthorization supports only card token".into())
        );

        auth.card = Some(Card::from_token("tok_1"));
        auth.validate().unwrap();

        let req = auth.build().unwrap();
        assert_eq!(
            req.params().iter().skip(7).collect::<Vec<_>>(),
            [
                ("OrderID", "ORDER-1"),
                ("ItemName", "Room"),
                ("Amount", "120.00"),
                ("Currency", "EUR"),
                ("CardToken", "tok_1"),
                ("Note", ""),
                ("OutputFormat", "json"),
            ]
        );
    }

    #[test]
    fn list_has_only_output_format() {
        let cnf = config();
        let list = AuthorizationList::new(&cnf);
        list.validate().unwrap();
        let req = list.build().unwrap();
        assert_eq!(req.params().len(), 8);
        assert_eq!(req.params().get("OutputFormat"), Some("json"));
    }
}
