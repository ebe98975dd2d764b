use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::audit_event::{AuditEvent as DomainAuditEvent, NewAuditEvent as DomainNewAuditEvent};
use crate::domain::types::{
    Action, AuditEventId, OrganizationId, Resource, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::audit_events)]
pub struct AuditEvent {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: Option<i32>,
    pub resource: String,
    pub action: String,
    pub record_id: i32,
    pub payload: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::audit_events)]
pub struct NewAuditEvent<'a> {
    pub organization_id: i32,
    pub user_id: Option<i32>,
    pub resource: &'a str,
    pub action: &'a str,
    pub record_id: i32,
    pub payload: String,
}

impl TryFrom<AuditEvent> for DomainAuditEvent {
    type Error = TypeConstraintError;

    fn try_from(event: AuditEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AuditEventId::try_from(event.id)?,
            organization_id: OrganizationId::try_from(event.organization_id)?,
            user_id: event.user_id.map(UserId::try_from).transpose()?,
            resource: event.resource.parse::<Resource>()?,
            action: event.action.parse::<Action>()?,
            record_id: event.record_id,
            // Unparseable payloads degrade to null.
            payload: serde_json::from_str(&event.payload).unwrap_or_default(),
            created_at: event.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewAuditEvent> for NewAuditEvent<'a> {
    fn from(event: &'a DomainNewAuditEvent) -> Self {
        Self {
            organization_id: event.organization_id.get(),
            user_id: event.user_id.map(UserId::get),
            resource: event.resource.as_str(),
            action: event.action.as_str(),
            record_id: event.record_id,
            payload: event.payload.to_string(),
        }
    }
}
