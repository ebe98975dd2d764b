use chrono::Utc;
use diesel::{Connection, dsl::count_star, prelude::*, sqlite::Sqlite};

use crate::{
    domain::{
        deal::{Deal, NewDeal},
        lead::{Lead, LeadStats, LeadStatus, NewLead, UpdateLead},
        types::{LeadId, OrganizationId},
    },
    models::{
        deal::{Deal as DbDeal, NewDeal as DbNewDeal},
        lead::{Lead as DbLead, NewLead as DbNewLead, UpdateLead as DbUpdateLead},
    },
    repository::{
        DieselRepository, LeadListQuery, LeadReader, LeadWriter,
        errors::{RepositoryError, RepositoryResult},
    },
    schema::{deals, leads},
};

fn filtered(query: &LeadListQuery) -> leads::BoxedQuery<'static, Sqlite> {
    let mut items = leads::table
        .filter(leads::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if !query.statuses.is_empty() {
        let statuses = query
            .statuses
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>();
        items = items.filter(leads::status.eq_any(statuses));
    }

    if let Some(term) = &query.search {
        let pattern = format!("%{term}%");
        items = items.filter(
            leads::title
                .like(pattern.clone())
                .or(leads::source.like(pattern)),
        );
    }

    items
}

impl LeadReader for DieselRepository {
    fn get_lead_by_id(
        &self,
        id: LeadId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Lead>> {
        let mut conn = self.conn()?;

        let lead = leads::table
            .find(id.get())
            .filter(leads::organization_id.eq(organization_id.get()))
            .first::<DbLead>(&mut conn)
            .optional()?;

        lead.map(Lead::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)?;

        let mut items = filtered(&query)
            .order(leads::created_at.desc())
            .then_order_by(leads::id.desc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let leads = items
            .load::<DbLead>(&mut conn)?
            .into_iter()
            .map(|l| Lead::try_from(l).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, leads))
    }

    fn lead_stats(&self, organization_id: OrganizationId) -> RepositoryResult<LeadStats> {
        let mut conn = self.conn()?;

        let rows = leads::table
            .filter(leads::organization_id.eq(organization_id.get()))
            .group_by(leads::status)
            .select((leads::status, count_star()))
            .load::<(String, i64)>(&mut conn)?;

        let counts = rows
            .into_iter()
            .map(|(status, count)| -> RepositoryResult<(LeadStatus, i64)> {
                Ok((status.parse::<LeadStatus>()?, count))
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(LeadStats::from_counts(counts))
    }
}

impl LeadWriter for DieselRepository {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;

        let db_new_lead: DbNewLead = new_lead.into();
        let lead = diesel::insert_into(leads::table)
            .values(&db_new_lead)
            .get_result::<DbLead>(&mut conn)?;

        Lead::try_from(lead).map_err(RepositoryError::from)
    }

    fn update_lead(
        &self,
        id: LeadId,
        organization_id: OrganizationId,
        updates: &UpdateLead,
    ) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;
        let changes = DbUpdateLead::from_domain(updates, Utc::now().naive_utc());

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let current = leads::table
                .find(id.get())
                .filter(leads::organization_id.eq(organization_id.get()))
                .first::<DbLead>(conn)?;

            // Converted is terminal.
            if current.status == LeadStatus::Converted.as_str()
                && updates.status != LeadStatus::Converted
            {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "lead {id} is converted"
                )));
            }

            let lead = diesel::update(leads::table.find(current.id))
                .set(&changes)
                .get_result::<DbLead>(conn)?;

            Lead::try_from(lead).map_err(RepositoryError::from)
        })
    }

    fn delete_lead(&self, id: LeadId, organization_id: OrganizationId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(
            leads::table
                .find(id.get())
                .filter(leads::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn convert_lead(
        &self,
        id: LeadId,
        organization_id: OrganizationId,
        deal: &NewDeal,
    ) -> RepositoryResult<(Lead, Deal)> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let lead = leads::table
                .find(id.get())
                .filter(leads::organization_id.eq(organization_id.get()))
                .first::<DbLead>(conn)?;

            if lead.status == LeadStatus::Converted.as_str() {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "lead {id} is already converted"
                )));
            }

            let lead = diesel::update(leads::table.find(lead.id))
                .set((
                    leads::status.eq(LeadStatus::Converted.as_str()),
                    leads::updated_at.eq(now),
                ))
                .get_result::<DbLead>(conn)?;

            let db_new_deal = DbNewDeal::from_domain(deal, now);
            let deal = diesel::insert_into(deals::table)
                .values(&db_new_deal)
                .get_result::<DbDeal>(conn)?;

            Ok((Lead::try_from(lead)?, Deal::try_from(deal)?))
        })
    }
}
