use chrono::Utc;
use diesel::{
    Connection,
    dsl::{count_star, sql},
    prelude::*,
    sql_types::BigInt,
    sqlite::Sqlite,
};

use crate::{
    domain::{
        deal::{Deal, DealStage, DealStats, NewDeal, UpdateDeal},
        types::{DealId, OrganizationId},
    },
    models::deal::{Deal as DbDeal, NewDeal as DbNewDeal, UpdateDeal as DbUpdateDeal},
    repository::{
        DealListQuery, DealReader, DealWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
    schema::deals,
};

fn filtered(query: &DealListQuery) -> deals::BoxedQuery<'static, Sqlite> {
    let mut items = deals::table
        .filter(deals::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if !query.stages.is_empty() {
        let stages = query.stages.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        items = items.filter(deals::stage.eq_any(stages));
    }

    items
}

impl DealReader for DieselRepository {
    fn get_deal_by_id(
        &self,
        id: DealId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Deal>> {
        let mut conn = self.conn()?;

        let deal = deals::table
            .find(id.get())
            .filter(deals::organization_id.eq(organization_id.get()))
            .first::<DbDeal>(&mut conn)
            .optional()?;

        deal.map(Deal::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_deals(&self, query: DealListQuery) -> RepositoryResult<(usize, Vec<Deal>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)?;

        let mut items = filtered(&query)
            .order(deals::updated_at.desc())
            .then_order_by(deals::id.desc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let deals = items
            .load::<DbDeal>(&mut conn)?
            .into_iter()
            .map(|d| Deal::try_from(d).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, deals))
    }

    fn deal_stats(&self, organization_id: OrganizationId) -> RepositoryResult<DealStats> {
        let mut conn = self.conn()?;

        let rows = deals::table
            .filter(deals::organization_id.eq(organization_id.get()))
            .group_by(deals::stage)
            .select((
                deals::stage,
                count_star(),
                sql::<BigInt>("COALESCE(SUM(amount), 0)"),
            ))
            .load::<(String, i64, i64)>(&mut conn)?;

        let rows = rows
            .into_iter()
            .map(|(stage, count, amount)| -> RepositoryResult<(DealStage, i64, i64)> {
                Ok((stage.parse::<DealStage>()?, count, amount))
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(DealStats::from_rows(rows))
    }
}

impl DealWriter for DieselRepository {
    fn create_deal(&self, new_deal: &NewDeal) -> RepositoryResult<Deal> {
        let mut conn = self.conn()?;

        let db_new_deal = DbNewDeal::from_domain(new_deal, Utc::now().naive_utc());
        let deal = diesel::insert_into(deals::table)
            .values(&db_new_deal)
            .get_result::<DbDeal>(&mut conn)?;

        Deal::try_from(deal).map_err(RepositoryError::from)
    }

    fn update_deal(
        &self,
        id: DealId,
        organization_id: OrganizationId,
        updates: &UpdateDeal,
    ) -> RepositoryResult<Deal> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let current = deals::table
                .find(id.get())
                .filter(deals::organization_id.eq(organization_id.get()))
                .first::<DbDeal>(conn)?;

            let changes = DbUpdateDeal {
                customer_id: updates.customer_id.map(|c| c.get()),
                owner_id: updates.owner_id.map(|u| u.get()),
                title: updates.title.as_str(),
                stage: updates.stage.as_str(),
                amount: updates.amount.get(),
                closed_at: updates.stage.closed_at(current.closed_at, now),
                updated_at: now,
            };

            let deal = diesel::update(deals::table.find(current.id))
                .set(&changes)
                .get_result::<DbDeal>(conn)?;

            Ok(Deal::try_from(deal)?)
        })
    }

    fn delete_deal(&self, id: DealId, organization_id: OrganizationId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(
            deals::table
                .find(id.get())
                .filter(deals::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
