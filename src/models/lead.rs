use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::lead::{
    Lead as DomainLead, LeadStatus, NewLead as DomainNewLead, UpdateLead as DomainUpdateLead,
};
use crate::domain::types::{
    Amount, CustomerId, LeadId, LeadSource, LeadTitle, OrganizationId, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::leads)]
/// Diesel model for [`crate::domain::lead::Lead`].
pub struct Lead {
    pub id: i32,
    pub organization_id: i32,
    pub customer_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub title: String,
    pub status: String,
    pub source: Option<String>,
    pub estimated_value: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::leads)]
pub struct NewLead<'a> {
    pub organization_id: i32,
    pub customer_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub title: &'a str,
    pub status: &'a str,
    pub source: Option<&'a str>,
    pub estimated_value: i64,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateLead<'a> {
    pub customer_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub title: &'a str,
    pub status: &'a str,
    pub source: Option<&'a str>,
    pub estimated_value: i64,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Lead> for DomainLead {
    type Error = TypeConstraintError;

    fn try_from(lead: Lead) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LeadId::try_from(lead.id)?,
            organization_id: OrganizationId::try_from(lead.organization_id)?,
            customer_id: lead.customer_id.map(CustomerId::try_from).transpose()?,
            assigned_to: lead.assigned_to.map(UserId::try_from).transpose()?,
            title: LeadTitle::new(lead.title)?,
            status: lead.status.parse::<LeadStatus>()?,
            source: lead.source.map(LeadSource::new).transpose()?,
            estimated_value: Amount::new(lead.estimated_value)?,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewLead> for NewLead<'a> {
    fn from(lead: &'a DomainNewLead) -> Self {
        Self {
            organization_id: lead.organization_id.get(),
            customer_id: lead.customer_id.map(CustomerId::get),
            assigned_to: lead.assigned_to.map(UserId::get),
            title: lead.title.as_str(),
            status: lead.status.as_str(),
            source: lead.source.as_ref().map(LeadSource::as_str),
            estimated_value: lead.estimated_value.get(),
        }
    }
}

impl<'a> UpdateLead<'a> {
    pub fn from_domain(lead: &'a DomainUpdateLead, updated_at: NaiveDateTime) -> Self {
        Self {
            customer_id: lead.customer_id.map(CustomerId::get),
            assigned_to: lead.assigned_to.map(UserId::get),
            title: lead.title.as_str(),
            status: lead.status.as_str(),
            source: lead.source.as_ref().map(LeadSource::as_str),
            estimated_value: lead.estimated_value.get(),
            updated_at,
        }
    }
}
