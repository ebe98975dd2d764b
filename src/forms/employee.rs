use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{UserEmail, UserName};
use crate::domain::user::NewUser;
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /employees`.
pub struct AddEmployeeForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Validated employee invitation.
#[derive(Debug, Clone, PartialEq)]
pub struct AddEmployeePayload {
    pub email: UserEmail,
    pub name: UserName,
}

impl TryFrom<AddEmployeeForm> for AddEmployeePayload {
    type Error = FormError;

    fn try_from(form: AddEmployeeForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            email: UserEmail::new(form.email)?,
            name: UserName::new(form.name)?,
        })
    }
}

impl AddEmployeePayload {
    pub fn new_user(&self) -> NewUser {
        NewUser::new(self.email.clone(), self.name.clone())
    }
}
