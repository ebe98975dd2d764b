use chrono::Utc;
use diesel::{Connection, prelude::*, sqlite::Sqlite};

use crate::{
    domain::{
        customer::{Customer, NewCustomer, UpdateCustomer},
        types::{CustomerId, OrganizationId, PublicId},
    },
    models::customer::{
        Customer as DbCustomer, NewCustomer as DbNewCustomer, UpdateCustomer as DbUpdateCustomer,
    },
    repository::{
        CustomerListQuery, CustomerReader, CustomerWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
    schema::customers,
};

fn filtered(query: &CustomerListQuery) -> customers::BoxedQuery<'static, Sqlite> {
    let mut items = customers::table
        .filter(customers::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(term) = &query.search {
        let pattern = format!("%{term}%");
        items = items.filter(
            customers::name
                .like(pattern.clone())
                .or(customers::email.like(pattern.clone()))
                .or(customers::phone.like(pattern.clone()))
                .or(customers::company.like(pattern)),
        );
    }

    items
}

impl CustomerReader for DieselRepository {
    fn get_customer_by_id(
        &self,
        id: CustomerId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Customer>> {
        let mut conn = self.conn()?;

        let customer = customers::table
            .find(id.get())
            .filter(customers::organization_id.eq(organization_id.get()))
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        customer
            .map(Customer::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)?;

        let mut items = filtered(&query)
            .order(customers::name.asc())
            .then_order_by(customers::id.asc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let customers = items
            .load::<DbCustomer>(&mut conn)?
            .into_iter()
            .map(|c| Customer::try_from(c).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, customers))
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;

        let public_id = PublicId::new();
        let db_new_customer = DbNewCustomer::from_domain(new_customer, &public_id);

        let customer = diesel::insert_into(customers::table)
            .values(&db_new_customer)
            .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(customer).map_err(RepositoryError::from)
    }

    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize> {
        if new_customers.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;

        let public_ids = new_customers
            .iter()
            .map(|_| PublicId::new())
            .collect::<Vec<_>>();
        let insertables = new_customers
            .iter()
            .zip(&public_ids)
            .map(|(customer, public_id)| DbNewCustomer::from_domain(customer, public_id))
            .collect::<Vec<_>>();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::insert_into(customers::table)
                .values(&insertables)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn update_customer(
        &self,
        id: CustomerId,
        organization_id: OrganizationId,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;

        let changes = DbUpdateCustomer::from_domain(updates, Utc::now().naive_utc());

        let customer = diesel::update(
            customers::table
                .find(id.get())
                .filter(customers::organization_id.eq(organization_id.get())),
        )
        .set(&changes)
        .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(customer).map_err(RepositoryError::from)
    }

    fn delete_customer(&self, id: CustomerId, organization_id: OrganizationId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(
            customers::table
                .find(id.get())
                .filter(customers::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
