use serde::Deserialize;
use validator::Validate;

use crate::domain::deal::{DealStage, NewDeal};
use crate::domain::lead::{Lead, LeadStatus, NewLead, UpdateLead};
use crate::domain::types::{
    Amount, CustomerId, DealTitle, LeadSource, LeadTitle, OrganizationId, UserId,
};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `POST /leads` and `PUT /leads/{id}`.
pub struct LeadForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub status: Option<String>,
    #[validate(length(max = 100))]
    pub source: Option<String>,
    #[validate(range(min = 0))]
    pub estimated_value: Option<i64>,
    pub customer_id: Option<i32>,
    pub assigned_to: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadPayload {
    pub title: LeadTitle,
    /// `None` keeps the stored status on update and means `new` on create.
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub estimated_value: Amount,
    pub customer_id: Option<CustomerId>,
    pub assigned_to: Option<UserId>,
}

impl TryFrom<LeadForm> for LeadPayload {
    type Error = FormError;

    fn try_from(form: LeadForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let status = non_blank(form.status)
            .map(|s| s.parse::<LeadStatus>())
            .transpose()?;
        // Only conversion may mark a lead converted.
        if status == Some(LeadStatus::Converted) {
            return Err(FormError::Field {
                field: "status",
                message: "leads become converted only through conversion".to_string(),
            });
        }
        Ok(Self {
            title: LeadTitle::new(form.title)?,
            status,
            source: non_blank(form.source).map(LeadSource::new).transpose()?,
            estimated_value: form
                .estimated_value
                .map(Amount::new)
                .transpose()?
                .unwrap_or_default(),
            customer_id: form.customer_id.map(CustomerId::new).transpose()?,
            assigned_to: form.assigned_to.map(UserId::new).transpose()?,
        })
    }
}

impl LeadPayload {
    pub fn into_new(self, organization_id: OrganizationId) -> NewLead {
        NewLead {
            organization_id,
            customer_id: self.customer_id,
            assigned_to: self.assigned_to,
            title: self.title,
            status: self.status.unwrap_or_default(),
            source: self.source,
            estimated_value: self.estimated_value,
        }
    }

    /// Changes for `current`; a missing status keeps the stored one.
    pub fn into_update(self, current: &Lead) -> UpdateLead {
        UpdateLead {
            customer_id: self.customer_id,
            assigned_to: self.assigned_to,
            title: self.title,
            status: self.status.unwrap_or(current.status),
            source: self.source,
            estimated_value: self.estimated_value,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `POST /leads/{id}/convert`; every field falls back to the lead.
pub struct ConvertLeadForm {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
    pub stage: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertLeadPayload {
    pub title: Option<DealTitle>,
    pub amount: Option<Amount>,
    pub stage: DealStage,
}

impl TryFrom<ConvertLeadForm> for ConvertLeadPayload {
    type Error = FormError;

    fn try_from(form: ConvertLeadForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            title: non_blank(form.title).map(DealTitle::new).transpose()?,
            amount: form.amount.map(Amount::new).transpose()?,
            stage: non_blank(form.stage)
                .map(|s| s.parse::<DealStage>())
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl ConvertLeadPayload {
    /// Deal created from `lead`, owned by `owner_id`.
    pub fn into_deal(self, lead: &Lead, owner_id: UserId) -> Result<NewDeal, FormError> {
        let title = match self.title {
            Some(title) => title,
            None => DealTitle::new(lead.title.as_str())?,
        };
        Ok(NewDeal {
            organization_id: lead.organization_id,
            customer_id: lead.customer_id,
            lead_id: Some(lead.id),
            owner_id: Some(lead.assigned_to.unwrap_or(owner_id)),
            title,
            stage: self.stage,
            amount: self.amount.unwrap_or(lead.estimated_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_new() {
        let payload = LeadPayload::try_from(LeadForm {
            title: "Website inquiry".into(),
            ..Default::default()
        })
        .expect("valid lead");

        assert_eq!(payload.status, None);
        assert_eq!(payload.estimated_value, Amount::zero());

        let new_lead = payload.into_new(OrganizationId::new(1).expect("valid org id"));
        assert_eq!(new_lead.status, LeadStatus::New);
    }

    #[test]
    fn converted_status_cannot_be_submitted() {
        let result = LeadPayload::try_from(LeadForm {
            title: "Inquiry".into(),
            status: Some("Converted".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(FormError::Field { field: "status", .. })));
    }

    #[test]
    fn negative_values_fail_validation() {
        let result = LeadPayload::try_from(LeadForm {
            title: "Inquiry".into(),
            estimated_value: Some(-5),
            ..Default::default()
        });
        assert!(matches!(result, Err(FormError::Validation(_))));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = LeadPayload::try_from(LeadForm {
            title: "Inquiry".into(),
            status: Some("archived".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(FormError::Constraint(_))));
    }
}
