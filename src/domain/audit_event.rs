use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{Action, AuditEventId, OrganizationId, Resource, UserId};

/// Record of a mutation performed inside an organization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub organization_id: OrganizationId,
    pub user_id: Option<UserId>,
    pub resource: Resource,
    pub action: Action,
    pub record_id: i32,
    pub payload: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAuditEvent {
    pub organization_id: OrganizationId,
    pub user_id: Option<UserId>,
    pub resource: Resource,
    pub action: Action,
    pub record_id: i32,
    pub payload: Value,
}

impl NewAuditEvent {
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        user_id: UserId,
        resource: Resource,
        action: Action,
        record_id: i32,
    ) -> Self {
        Self {
            organization_id,
            user_id: Some(user_id),
            resource,
            action,
            record_id,
            payload: Value::Object(Default::default()),
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}
