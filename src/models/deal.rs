use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::deal::{Deal as DomainDeal, DealStage, NewDeal as DomainNewDeal};
use crate::domain::types::{
    Amount, CustomerId, DealId, DealTitle, LeadId, OrganizationId, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::deals)]
/// Diesel model for [`crate::domain::deal::Deal`].
pub struct Deal {
    pub id: i32,
    pub organization_id: i32,
    pub customer_id: Option<i32>,
    pub lead_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub title: String,
    pub stage: String,
    pub amount: i64,
    pub closed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::deals)]
pub struct NewDeal<'a> {
    pub organization_id: i32,
    pub customer_id: Option<i32>,
    pub lead_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub title: &'a str,
    pub stage: &'a str,
    pub amount: i64,
    pub closed_at: Option<NaiveDateTime>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::deals)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateDeal<'a> {
    pub customer_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub title: &'a str,
    pub stage: &'a str,
    pub amount: i64,
    pub closed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Deal> for DomainDeal {
    type Error = TypeConstraintError;

    fn try_from(deal: Deal) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DealId::try_from(deal.id)?,
            organization_id: OrganizationId::try_from(deal.organization_id)?,
            customer_id: deal.customer_id.map(CustomerId::try_from).transpose()?,
            lead_id: deal.lead_id.map(LeadId::try_from).transpose()?,
            owner_id: deal.owner_id.map(UserId::try_from).transpose()?,
            title: DealTitle::new(deal.title)?,
            stage: deal.stage.parse::<DealStage>()?,
            amount: Amount::new(deal.amount)?,
            closed_at: deal.closed_at,
            created_at: deal.created_at,
            updated_at: deal.updated_at,
        })
    }
}

impl<'a> NewDeal<'a> {
    pub fn from_domain(deal: &'a DomainNewDeal, now: NaiveDateTime) -> Self {
        Self {
            organization_id: deal.organization_id.get(),
            customer_id: deal.customer_id.map(CustomerId::get),
            lead_id: deal.lead_id.map(LeadId::get),
            owner_id: deal.owner_id.map(UserId::get),
            title: deal.title.as_str(),
            stage: deal.stage.as_str(),
            amount: deal.amount.get(),
            closed_at: deal.stage.closed_at(None, now),
        }
    }
}
