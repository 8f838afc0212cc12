use serde::{Deserialize, Serialize};

use super::or_empty;
use crate::{
    error::{IpcError, Result},
    helper,
    request::IpcRequest,
};

/// Payer details shown on the hosted payment page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// ISO 3166-1 country code
    pub country: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub address: Option<String>,
}

impl Customer {
    /// Checks the fields a full payment page cannot collect itself.
    pub fn validate(&self) -> Result<()> {
        if !self.first_name.as_deref().is_some_and(helper::is_present) {
            return Err(IpcError::validation("Invalid First name"));
        }
        if !self.last_name.as_deref().is_some_and(helper::is_present) {
            return Err(IpcError::validation("Invalid Last name"));
        }
        if !self.email.as_deref().is_some_and(helper::is_valid_email) {
            return Err(IpcError::validation("Invalid Email"));
        }
        Ok(())
    }

    pub(crate) fn add_to(&self, req: &mut IpcRequest<'_>) {
        req.add_param("customeremail", or_empty(&self.email))
            .add_param("customerphone", or_empty(&self.phone))
            .add_param("customerfirstnames", or_empty(&self.first_name))
            .add_param("customerfamilyname", or_empty(&self.last_name))
            .add_param("customercountry", or_empty(&self.country))
            .add_param("customercity", or_empty(&self.city))
            .add_param("customerzipcode", or_empty(&self.zip))
            .add_param("customeraddress", or_empty(&self.address));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_requires_names_and_email() {
        let mut customer = Customer {
            first_name: Some("John".into()),
            last_name: Some("Smith".into()),
            email: Some("john@example".into()),
            ..Default::default()
        };
        assert_eq!(
            customer.validate().unwrap_err(),
            IpcError::Validation("Invalid Email".into())
        );

        customer.email = Some("john@example.com".into());
        assert!(customer.validate().is_ok());

        customer.last_name = None;
        assert!(customer.validate().is_err());
    }
}
