use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{
    Customer as DomainCustomer, NewCustomer as DomainNewCustomer,
    UpdateCustomer as DomainUpdateCustomer,
};
use crate::domain::types::{
    CompanyName, CustomerEmail, CustomerId, CustomerName, NoteText, OrganizationId, PhoneNumber,
    PublicId, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
/// Diesel model for [`crate::domain::customer::Customer`].
pub struct Customer {
    pub id: i32,
    pub public_id: Vec<u8>,
    pub organization_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
/// Insertable form of [`Customer`].
pub struct NewCustomer<'a> {
    pub public_id: &'a [u8],
    pub organization_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Customer`] record.
pub struct UpdateCustomer<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Customer> for DomainCustomer {
    type Error = TypeConstraintError;

    fn try_from(customer: Customer) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CustomerId::try_from(customer.id)?,
            public_id: PublicId::from_bytes(&customer.public_id)?,
            organization_id: OrganizationId::try_from(customer.organization_id)?,
            name: CustomerName::new(customer.name)?,
            email: customer.email.map(CustomerEmail::new).transpose()?,
            phone: customer.phone.map(PhoneNumber::new).transpose()?,
            company: customer.company.map(CompanyName::new).transpose()?,
            notes: customer.notes.map(NoteText::new).transpose()?,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        })
    }
}

impl<'a> NewCustomer<'a> {
    /// Builds the insertable row; `public_id` is generated by the caller.
    pub fn from_domain(customer: &'a DomainNewCustomer, public_id: &'a PublicId) -> Self {
        Self {
            public_id: public_id.as_bytes(),
            organization_id: customer.organization_id.get(),
            name: customer.name.as_str(),
            email: customer.email.as_ref().map(CustomerEmail::as_str),
            phone: customer.phone.as_ref().map(PhoneNumber::as_str),
            company: customer.company.as_ref().map(CompanyName::as_str),
            notes: customer.notes.as_ref().map(NoteText::as_str),
        }
    }
}

impl<'a> UpdateCustomer<'a> {
    pub fn from_domain(customer: &'a DomainUpdateCustomer, updated_at: NaiveDateTime) -> Self {
        Self {
            name: customer.name.as_str(),
            email: customer.email.as_ref().map(CustomerEmail::as_str),
            phone: customer.phone.as_ref().map(PhoneNumber::as_str),
            company: customer.company.as_ref().map(CompanyName::as_str),
            notes: customer.notes.as_ref().map(NoteText::as_str),
            updated_at,
        }
    }
}
