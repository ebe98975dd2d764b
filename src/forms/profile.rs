use serde::Deserialize;

use crate::domain::types::ProfileId;
use crate::forms::FormError;

#[derive(Debug, Deserialize)]
pub struct SetActiveProfileForm {
    pub profile_id: i32,
}

impl TryFrom<SetActiveProfileForm> for ProfileId {
    type Error = FormError;

    fn try_from(form: SetActiveProfileForm) -> Result<Self, Self::Error> {
        Ok(ProfileId::new(form.profile_id)?)
    }
}
