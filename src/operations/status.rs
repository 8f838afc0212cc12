use super::{or_empty, require_output_format, require_text};
use crate::{
    config::Config,
    defines::OutputFormat,
    error::Result,
    request::IpcRequest,
    response::Response,
    transport::Transport,
};

/// Queries the state of an order (`IPCGetPaymentStatus`).
#[derive(Debug, Clone)]
pub struct GetPaymentStatus<'a> {
    cnf: &'a Config,
    pub order_id: Option<String>,
    pub output_format: OutputFormat,
}

impl<'a> GetPaymentStatus<'a> {
    pub fn new(cnf: &'a Config) -> Self {
        Self {
            cnf,
            order_id: None,
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_output_format(self.output_format)?;
        require_text(self.order_id.as_deref(), "Invalid OrderId")?;
        Ok(())
    }

    pub fn build(&self) -> Result<IpcRequest<'a>> {
        let mut req = IpcRequest::new(self.cnf, "IPCGetPaymentStatus");
        req.add_param("OrderID", or_empty(&self.order_id))
            .add_output_format(self.output_format);
        Ok(req)
    }

    pub async fn process(&self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        self.build()?.send_post(transport).await
    }
}
