use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use validator::Validate;

use crate::domain::customer::{NewCustomer, UpdateCustomer};
use crate::domain::types::{
    CompanyName, CustomerEmail, CustomerName, NoteText, OrganizationId, PhoneNumber,
    TypeConstraintError,
};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `POST /customers` and `PUT /customers/{id}`.
pub struct CustomerForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub company: Option<String>,
    #[validate(length(max = 10000))]
    pub notes: Option<String>,
}

/// Validated customer fields shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerPayload {
    pub name: CustomerName,
    pub email: Option<CustomerEmail>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub notes: Option<NoteText>,
}

impl CustomerPayload {
    fn from_fields(
        name: String,
        email: Option<String>,
        phone: Option<String>,
        company: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            name: CustomerName::new(name)?,
            email: non_blank(email).map(CustomerEmail::new).transpose()?,
            phone: non_blank(phone).map(PhoneNumber::new).transpose()?,
            company: non_blank(company).map(CompanyName::new).transpose()?,
            notes: non_blank(notes).map(NoteText::new).transpose()?,
        })
    }

    pub fn into_new(self, organization_id: OrganizationId) -> NewCustomer {
        NewCustomer::new(
            organization_id,
            self.name,
            self.email,
            self.phone,
            self.company,
            self.notes,
        )
    }

    pub fn into_update(self) -> UpdateCustomer {
        UpdateCustomer {
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            notes: self.notes,
        }
    }
}

impl TryFrom<CustomerForm> for CustomerPayload {
    type Error = FormError;

    fn try_from(form: CustomerForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self::from_fields(
            form.name,
            form.email,
            form.phone,
            form.company,
            form.notes,
        )?)
    }
}

#[derive(MultipartForm)]
/// Multipart body of `POST /customers/upload`.
pub struct UploadCustomersForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadCustomersForm {
    pub fn parse(&mut self, organization_id: OrganizationId) -> Result<Vec<NewCustomer>, FormError> {
        let file = self.csv.file.reopen()?;
        parse_customers_csv(file, organization_id)
    }
}

/// Reads customers from CSV with a `name,email,phone,company,notes` header.
///
/// Rows go through the same validation as `CustomerForm` bodies. Only `name`
/// is required; the whole upload is rejected on the first bad row.
pub fn parse_customers_csv<R: Read>(
    reader: R,
    organization_id: OrganizationId,
) -> Result<Vec<NewCustomer>, FormError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut customers = Vec::new();
    for (index, record) in reader.deserialize::<CustomerForm>().enumerate() {
        // Header is line 1.
        let row = index + 2;
        let payload = CustomerPayload::try_from(record?).map_err(|err| FormError::InvalidRow {
            row,
            message: err.to_string(),
        })?;
        customers.push(payload.into_new(organization_id));
    }

    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> OrganizationId {
        OrganizationId::new(7).expect("valid org id")
    }

    #[test]
    fn form_normalizes_optional_fields() {
        let payload = CustomerPayload::try_from(CustomerForm {
            name: " Jane Doe ".into(),
            email: Some("JANE@example.com".into()),
            phone: Some("  ".into()),
            company: Some("Acme".into()),
            notes: Some("<b>VIP</b><script>x</script>".into()),
        })
        .expect("valid customer");

        assert_eq!(payload.name.as_str(), "Jane Doe");
        assert_eq!(payload.email.as_ref().map(|e| e.as_str()), Some("jane@example.com"));
        assert_eq!(payload.phone, None);
        assert_eq!(payload.notes.as_ref().map(|n| n.as_str()), Some("<b>VIP</b>"));
    }

    #[test]
    fn form_rejects_bad_email() {
        let result = CustomerPayload::try_from(CustomerForm {
            name: "Jane".into(),
            email: Some("nope".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(FormError::Constraint(_))));
    }

    #[test]
    fn csv_rows_become_customers() {
        let data = "name,email,phone,company,notes\n\
                    Alice,alice@example.com,+14155552671,Acme,\n\
                    Bob,,,,Met at expo\n";

        let customers = parse_customers_csv(data.as_bytes(), org()).expect("valid csv");

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].organization_id, org());
        assert_eq!(customers[0].phone.as_ref().map(|p| p.as_str()), Some("+14155552671"));
        assert_eq!(customers[1].email, None);
        assert_eq!(customers[1].notes.as_ref().map(|n| n.as_str()), Some("Met at expo"));
    }

    #[test]
    fn csv_reports_the_offending_row() {
        let data = "name,email\nAlice,alice@example.com\n ,bob@example.com\n";

        let result = parse_customers_csv(data.as_bytes(), org());

        assert!(matches!(result, Err(FormError::InvalidRow { row: 3, .. })));
    }

    #[test]
    fn csv_rows_respect_form_limits() {
        let long_company = "x".repeat(256);
        let data = format!("name,company\nAlice,Acme\nBob,{long_company}\n");

        let result = parse_customers_csv(data.as_bytes(), org());

        assert!(matches!(result, Err(FormError::InvalidRow { row: 3, .. })));
    }
}
