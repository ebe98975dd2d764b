use serde::Deserialize;
use validator::Validate;

use crate::domain::deal::{DealStage, NewDeal, UpdateDeal};
use crate::domain::types::{Amount, CustomerId, DealTitle, OrganizationId, UserId};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `POST /deals` and `PUT /deals/{id}`.
pub struct DealForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub stage: Option<String>,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
    pub customer_id: Option<i32>,
    pub owner_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DealPayload {
    pub title: DealTitle,
    pub stage: DealStage,
    pub amount: Amount,
    pub customer_id: Option<CustomerId>,
    pub owner_id: Option<UserId>,
}

impl TryFrom<DealForm> for DealPayload {
    type Error = FormError;

    fn try_from(form: DealForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            title: DealTitle::new(form.title)?,
            stage: non_blank(form.stage)
                .map(|s| s.parse::<DealStage>())
                .transpose()?
                .unwrap_or_default(),
            amount: form.amount.map(Amount::new).transpose()?.unwrap_or_default(),
            customer_id: form.customer_id.map(CustomerId::new).transpose()?,
            owner_id: form.owner_id.map(UserId::new).transpose()?,
        })
    }
}

impl DealPayload {
    /// New deal; the caller owns it unless another owner was given.
    pub fn into_new(self, organization_id: OrganizationId, caller: UserId) -> NewDeal {
        NewDeal {
            organization_id,
            customer_id: self.customer_id,
            lead_id: None,
            owner_id: Some(self.owner_id.unwrap_or(caller)),
            title: self.title,
            stage: self.stage,
            amount: self.amount,
        }
    }

    pub fn into_update(self) -> UpdateDeal {
        UpdateDeal {
            customer_id: self.customer_id,
            owner_id: self.owner_id,
            title: self.title,
            stage: self.stage,
            amount: self.amount,
        }
    }
}
