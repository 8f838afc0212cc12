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

/// Partial or full refund of a settled transaction (`IPCRefund`).
#[derive(Debug, Clone)]
pub struct Refund<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    /// Gateway transaction reference (`IPC_Trnref`)
    pub trnref: Option<String>,
    pub amount: Option<f64>,
    pub currency: String,
    pub output_format: OutputFormat,
}

impl<'a> Refund<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            trnref: None,
            amount: None,
            currency: "EUR".to_owned(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_amount(self.amount)?;
        require_currency(&self.currency)?;
        require_text(self.trnref.as_deref(), "Invalid TrnRef")?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        Ok(())
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let amount = require_amount(self.amount)?;
        let mut req = IpcRequest::new(self.cnf, "IPCRefund");

        req.add_param("Currency", &self.currency)
            .add_param("Amount", helper::format_amount(amount))
            .add_param("OrderID", or_empty(&self.order_id))
            .add_param("IPC_Trnref", or_empty(&self.trnref))
            .add_output_format(self.output_format);

        Ok(req)
    }

    /// Sends the refund. Use [`Refund::is_confirmed`] on the reply to check
    /// the gateway actually accepted it.
    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }

    /// Whether a verified reply confirms this refund: success status, a
    /// transaction reference, and the amount and currency echoed back.
    pub fn is_confirmed(&self, resp: &Response) -> bool {
        let echoed_amount = resp
            .get_text("Amount")
            .and_then(|a| a.trim().parse::<f64>().ok());
        let amount_matches = match (echoed_amount, self.amount) {
            (Some(echoed), Some(sent)) => (echoed - sent).abs() < 0.005,
            _ => false,
        };

        resp.is_success()
            && resp
                .get_text("IPC_Trnref")
                .is_some_and(|t| helper::is_present(&t))
            && amount_matches
            && resp
                .get_text("Currency")
                .is_some_and(|c| c.eq_ignore_ascii_case(&self.currency))
    }
}

/// Cancels a transaction before settlement (`IPCReversal`).
#[derive(Debug, Clone)]
pub struct Reversal<'a> {
    cnf: &'a Config,
    pub trnref: Option<String>,
    pub output_format: OutputFormat,
}

impl<'a> Reversal<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            trnref: None,
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_text(self.trnref.as_deref(), "Invalid TrnRef")?;
        Ok(())
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let mut req = IpcRequest::new(self.cnf, "IPCReversal");
        req.add_param("IPC_Trnref", or_empty(&self.trnref))
            .add_output_format(self.output_format);
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
    use crate::{
        error::IpcError,
        test_utils::{config, signed_json},
    };

    fn refund(cnf: &Config) -> Refund<'_> {
        let mut r = Refund::new(cnf);
        r.order_id = Some("ORDER-1".into());
        r.trnref = Some("TRN-1".into());
        r.amount = Some(10.0);
        r
    }

    #[test]
    fn refund_field_order() {
        let cnf = config();
        let req = refund(&cnf).build().unwrap();

        assert_eq!(
            req.params().iter().skip(7).collect::<Vec<_>>(),
            [
                ("Currency", "EUR"),
                ("Amount", "10.00"),
                ("OrderID", "ORDER-1"),
                ("IPC_Trnref", "TRN-1"),
                ("OutputFormat", "json"),
            ]
        );
    }

    #[test]
    fn refund_validation() {
        let cnf = config();
        let mut r = refund(&cnf);
        r.trnref = None;
        assert_eq!(
            r.validate().unwrap_err(),
            IpcError::Validation("Invalid TrnRef".into())
        );

        let mut r = refund(&cnf);
        r.amount = Some(-1.0);
        assert!(r.validate().is_err());
    }

    #[test]
    fn confirmation_checks_echoed_fields() {
        let cnf = config();
        let r = refund(&cnf);

        let ok = Response::new(
            &cnf,
            signed_json(&[
                ("Status", "0"),
                ("IPC_Trnref", "TRN-1"),
                ("Amount", "10.00"),
                ("Currency", "EUR"),
            ]),
            OutputFormat::Json,
        )
        .unwrap();
        assert!(r.is_confirmed(&ok));

        let short = Response::new(
            &cnf,
            signed_json(&[
                ("Status", "0"),
                ("IPC_Trnref", "TRN-1"),
                ("Amount", "5.00"),
                ("Currency", "EUR"),
            ]),
            OutputFormat::Json,
        )
        .unwrap();
        assert!(!r.is_confirmed(&short));

        let declined = Response::new(
            &cnf,
            signed_json(&[("Status", "7"), ("IPC_Trnref", "TRN-1")]),
            OutputFormat::Json,
        )
        .unwrap();
        assert!(!r.is_confirmed(&declined));
    }

    #[test]
    fn reversal_fields() {
        let cnf = config();
        let mut r = Reversal::new(&cnf);
        assert!(r.validate().is_err());

        r.trnref = Some("TRN-9".into());
        r.output_format = OutputFormat::Xml;
        let req = r.build().unwrap();
        assert_eq!(
            req.params().iter().skip(7).collect::<Vec<_>>(),
            [("IPC_Trnref", "TRN-9"), ("OutputFormat", "xml")]
        );
    }
}
