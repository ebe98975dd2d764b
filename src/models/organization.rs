use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::organization::{
    NewOrganization as DomainNewOrganization, Organization as DomainOrganization,
};
use crate::domain::types::{OrganizationId, OrganizationName, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::organizations)]
/// Diesel model for [`crate::domain::organization::Organization`].
pub struct Organization {
    pub id: i32,
    pub name: String,
    pub owner_id: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::organizations)]
pub struct NewOrganization<'a> {
    pub name: &'a str,
    pub owner_id: Option<i32>,
}

impl TryFrom<Organization> for DomainOrganization {
    type Error = TypeConstraintError;

    fn try_from(org: Organization) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrganizationId::try_from(org.id)?,
            name: OrganizationName::new(org.name)?,
            owner_id: org.owner_id.map(UserId::try_from).transpose()?,
            is_active: org.is_active,
            created_at: org.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewOrganization> for NewOrganization<'a> {
    fn from(org: &'a DomainNewOrganization) -> Self {
        Self {
            name: org.name.as_str(),
            owner_id: Some(org.owner_id.get()),
        }
    }
}
