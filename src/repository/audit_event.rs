use diesel::{prelude::*, sqlite::Sqlite};

use crate::{
    domain::audit_event::{AuditEvent, NewAuditEvent},
    models::audit_event::{AuditEvent as DbAuditEvent, NewAuditEvent as DbNewAuditEvent},
    repository::{
        AuditListQuery, AuditReader, AuditWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
    schema::audit_events,
};

fn filtered(query: &AuditListQuery) -> audit_events::BoxedQuery<'static, Sqlite> {
    let mut items = audit_events::table
        .filter(audit_events::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(resource) = query.resource {
        items = items.filter(audit_events::resource.eq(resource.as_str()));
    }

    items
}

impl AuditReader for DieselRepository {
    fn list_audit_events(
        &self,
        query: AuditListQuery,
    ) -> RepositoryResult<(usize, Vec<AuditEvent>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)?;

        let mut items = filtered(&query).order(audit_events::id.desc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let events = items
            .load::<DbAuditEvent>(&mut conn)?
            .into_iter()
            .map(|e| AuditEvent::try_from(e).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, events))
    }
}

impl AuditWriter for DieselRepository {
    fn create_audit_event(&self, event: &NewAuditEvent) -> RepositoryResult<AuditEvent> {
        let mut conn = self.conn()?;

        let db_new_event: DbNewAuditEvent = event.into();
        let event = diesel::insert_into(audit_events::table)
            .values(&db_new_event)
            .get_result::<DbAuditEvent>(&mut conn)?;

        AuditEvent::try_from(event).map_err(RepositoryError::from)
    }
}
