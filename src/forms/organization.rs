use serde::Deserialize;
use validator::Validate;

use crate::domain::types::OrganizationName;
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /organizations` and `PUT /organizations/current`.
pub struct OrganizationForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

impl TryFrom<OrganizationForm> for OrganizationName {
    type Error = FormError;

    fn try_from(form: OrganizationForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(OrganizationName::new(form.name)?)
    }
}
