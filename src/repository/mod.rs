//! Repository traits and the Diesel-backed implementation.
//!
//! Every tenant-scoped read and write takes the [`OrganizationId`] of the
//! current context so rows of other organizations are never touched.

use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;

use crate::db::{DbPool, get_connection};
use crate::domain::{
    audit_event::{AuditEvent, NewAuditEvent},
    customer::{Customer, NewCustomer, UpdateCustomer},
    deal::{Deal, DealStage, DealStats, NewDeal, UpdateDeal},
    lead::{Lead, LeadStats, LeadStatus, NewLead, UpdateLead},
    organization::{NewOrganization, Organization},
    role::{NewRole, NewUserRole, Permission, Role, RoleTemplate, RoleWithPermissions},
    types::{
        CustomerId, DealId, LeadId, OrganizationId, OrganizationName, PermissionCode, ProfileId,
        ProfileType, Resource, RoleId, UserEmail, UserId,
    },
    user::{NewUser, NewUserProfile, User, UserProfile},
};
use crate::repository::errors::RepositoryResult;

pub mod audit_event;
pub mod customer;
pub mod deal;
pub mod errors;
pub mod lead;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod organization;
pub mod role;
pub mod user;

/// Diesel repository shared by every service.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<PooledConnection<ConnectionManager<SqliteConnection>>> {
        Ok(get_connection(&self.pool)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// SQL `LIMIT`/`OFFSET`; pages past `i64` range saturate to an empty page.
    pub(crate) fn limit_offset(&self) -> (i64, i64) {
        let page = i64::try_from(self.page.max(1)).unwrap_or(i64::MAX);
        let per_page = i64::try_from(self.per_page).unwrap_or(i64::MAX);
        (per_page, (page - 1).saturating_mul(per_page))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerListQuery {
    pub organization_id: OrganizationId,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            search: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_string());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadListQuery {
    pub organization_id: OrganizationId,
    /// Empty means any status.
    pub statuses: Vec<LeadStatus>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl LeadListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            statuses: Vec::new(),
            search: None,
            pagination: None,
        }
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = LeadStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_string());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DealListQuery {
    pub organization_id: OrganizationId,
    /// Empty means any stage.
    pub stages: Vec<DealStage>,
    pub pagination: Option<Pagination>,
}

impl DealListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            stages: Vec::new(),
            pagination: None,
        }
    }

    pub fn stages(mut self, stages: impl IntoIterator<Item = DealStage>) -> Self {
        self.stages = stages.into_iter().collect();
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditListQuery {
    pub organization_id: OrganizationId,
    pub resource: Option<Resource>,
    pub pagination: Option<Pagination>,
}

impl AuditListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            resource: None,
            pagination: None,
        }
    }

    pub fn resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
}

pub trait UserWriter {
    /// Inserts the user unless the email is already known; returns the stored row.
    fn get_or_create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn set_active_profile(
        &self,
        user_id: UserId,
        profile_id: Option<ProfileId>,
    ) -> RepositoryResult<()>;
    fn set_superuser(&self, email: &UserEmail, is_superuser: bool) -> RepositoryResult<User>;
}

pub trait OrganizationReader {
    fn get_organization_by_id(&self, id: OrganizationId)
    -> RepositoryResult<Option<Organization>>;
    /// Active organizations the user owns or holds an active profile in.
    fn list_user_organizations(&self, user_id: UserId) -> RepositoryResult<Vec<Organization>>;
    fn list_all_organizations(&self) -> RepositoryResult<Vec<Organization>>;
}

pub trait OrganizationWriter {
    /// Creates the organization, the owner's vendor profile and the given
    /// roles in one transaction and makes the vendor profile active.
    fn create_organization(
        &self,
        new_organization: &NewOrganization,
        roles: &[RoleTemplate],
    ) -> RepositoryResult<(Organization, UserProfile)>;
    fn update_organization_name(
        &self,
        id: OrganizationId,
        name: &OrganizationName,
    ) -> RepositoryResult<Organization>;
}

pub trait ProfileReader {
    fn get_profile_by_id(&self, id: ProfileId) -> RepositoryResult<Option<UserProfile>>;
    /// Active profiles of the user inside the organization.
    fn list_profiles_in_organization(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<UserProfile>>;
    /// Every profile of the user ordered by id.
    fn list_user_profiles(&self, user_id: UserId) -> RepositoryResult<Vec<UserProfile>>;
    /// Active members of the organization, optionally limited to one profile type.
    fn list_organization_members(
        &self,
        organization_id: OrganizationId,
        profile_type: Option<ProfileType>,
    ) -> RepositoryResult<Vec<(UserProfile, User)>>;
}

pub trait ProfileWriter {
    fn create_or_activate_profile(
        &self,
        new_profile: &NewUserProfile,
    ) -> RepositoryResult<UserProfile>;
    /// Deactivates the user's profiles and role assignments in the organization.
    fn remove_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<usize>;
}

pub trait RoleReader {
    fn list_permissions(&self) -> RepositoryResult<Vec<Permission>>;
    /// Active roles of the organization with their permissions.
    fn list_roles(&self, organization_id: OrganizationId)
    -> RepositoryResult<Vec<RoleWithPermissions>>;
    fn get_role(
        &self,
        id: RoleId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<RoleWithPermissions>>;
    /// Union of permissions of the user's active assignments to active roles.
    fn list_user_permissions(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<PermissionCode>>;
    fn list_user_roles(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<Role>>;
}

pub trait RoleWriter {
    fn create_role(&self, new_role: &NewRole) -> RepositoryResult<RoleWithPermissions>;
    fn replace_role_permissions(
        &self,
        id: RoleId,
        organization_id: OrganizationId,
        permissions: &[PermissionCode],
    ) -> RepositoryResult<RoleWithPermissions>;
    fn deactivate_role(&self, id: RoleId, organization_id: OrganizationId)
    -> RepositoryResult<()>;
    fn assign_role(&self, assignment: &NewUserRole) -> RepositoryResult<()>;
    fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()>;
}

pub trait CustomerReader {
    fn get_customer_by_id(
        &self,
        id: CustomerId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Customer>>;
    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
}

pub trait CustomerWriter {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize>;
    fn update_customer(
        &self,
        id: CustomerId,
        organization_id: OrganizationId,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer>;
    fn delete_customer(&self, id: CustomerId, organization_id: OrganizationId)
    -> RepositoryResult<()>;
}

pub trait LeadReader {
    fn get_lead_by_id(
        &self,
        id: LeadId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Lead>>;
    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
    fn lead_stats(&self, organization_id: OrganizationId) -> RepositoryResult<LeadStats>;
}

pub trait LeadWriter {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
    fn update_lead(
        &self,
        id: LeadId,
        organization_id: OrganizationId,
        updates: &UpdateLead,
    ) -> RepositoryResult<Lead>;
    fn delete_lead(&self, id: LeadId, organization_id: OrganizationId) -> RepositoryResult<()>;
    /// Marks the lead converted and inserts `deal` atomically.
    ///
    /// Fails with a constraint violation when the lead is already converted.
    fn convert_lead(
        &self,
        id: LeadId,
        organization_id: OrganizationId,
        deal: &NewDeal,
    ) -> RepositoryResult<(Lead, Deal)>;
}

pub trait DealReader {
    fn get_deal_by_id(
        &self,
        id: DealId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Deal>>;
    fn list_deals(&self, query: DealListQuery) -> RepositoryResult<(usize, Vec<Deal>)>;
    fn deal_stats(&self, organization_id: OrganizationId) -> RepositoryResult<DealStats>;
}

pub trait DealWriter {
    fn create_deal(&self, new_deal: &NewDeal) -> RepositoryResult<Deal>;
    fn update_deal(
        &self,
        id: DealId,
        organization_id: OrganizationId,
        updates: &UpdateDeal,
    ) -> RepositoryResult<Deal>;
    fn delete_deal(&self, id: DealId, organization_id: OrganizationId) -> RepositoryResult<()>;
}

pub trait AuditReader {
    fn list_audit_events(&self, query: AuditListQuery)
    -> RepositoryResult<(usize, Vec<AuditEvent>)>;
}

pub trait AuditWriter {
    fn create_audit_event(&self, event: &NewAuditEvent) -> RepositoryResult<AuditEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_terms_are_ignored() {
        let org = OrganizationId::new(1).expect("valid org id");
        assert_eq!(CustomerListQuery::new(org).search("   ").search, None);
        assert_eq!(
            LeadListQuery::new(org).search(" acme ").search.as_deref(),
            Some("acme")
        );
    }

    #[test]
    fn pagination_offsets_are_clamped() {
        let pagination = Pagination { page: 0, per_page: 20 };
        assert_eq!(pagination.limit_offset(), (20, 0));
        let pagination = Pagination { page: 3, per_page: 20 };
        assert_eq!(pagination.limit_offset(), (20, 40));
        let pagination = Pagination {
            page: 922_337_203_685_477_580,
            per_page: 20,
        };
        assert_eq!(pagination.limit_offset(), (20, i64::MAX));
        let pagination = Pagination {
            page: usize::MAX,
            per_page: 20,
        };
        assert_eq!(pagination.limit_offset(), (20, i64::MAX));
    }
}
