use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CompanyName, CustomerEmail, CustomerId, CustomerName, NoteText, OrganizationId, PhoneNumber,
    PublicId,
};

/// Domain representation of a customer of an organization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub public_id: PublicId,
    pub organization_id: OrganizationId,
    pub name: CustomerName,
    pub email: Option<CustomerEmail>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub notes: Option<NoteText>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCustomer {
    pub organization_id: OrganizationId,
    pub name: CustomerName,
    pub email: Option<CustomerEmail>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub notes: Option<NoteText>,
}

impl NewCustomer {
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        name: CustomerName,
        email: Option<CustomerEmail>,
        phone: Option<PhoneNumber>,
        company: Option<CompanyName>,
        notes: Option<NoteText>,
    ) -> Self {
        Self {
            organization_id,
            name,
            email,
            phone,
            company,
            notes,
        }
    }
}

/// Replacement values for an existing customer.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateCustomer {
    pub name: CustomerName,
    pub email: Option<CustomerEmail>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub notes: Option<NoteText>,
}
