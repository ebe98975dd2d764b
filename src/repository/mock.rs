//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::audit_event::{AuditEvent, NewAuditEvent};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::deal::{Deal, DealStats, NewDeal, UpdateDeal};
use crate::domain::lead::{Lead, LeadStats, NewLead, UpdateLead};
use crate::domain::organization::{NewOrganization, Organization};
use crate::domain::role::{NewRole, NewUserRole, Permission, Role, RoleTemplate, RoleWithPermissions};
use crate::domain::types::{
    CustomerId, DealId, LeadId, OrganizationId, OrganizationName, PermissionCode, ProfileId,
    ProfileType, RoleId, UserEmail, UserId,
};
use crate::domain::user::{NewUser, NewUserProfile, User, UserProfile};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    AuditListQuery, AuditReader, AuditWriter, CustomerListQuery, CustomerReader, CustomerWriter,
    DealListQuery, DealReader, DealWriter, LeadListQuery, LeadReader, LeadWriter,
    OrganizationReader, OrganizationWriter, ProfileReader, ProfileWriter, RoleReader, RoleWriter,
    UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
    }

    impl UserWriter for Repository {
        fn get_or_create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn set_active_profile(
            &self,
            user_id: UserId,
            profile_id: Option<ProfileId>,
        ) -> RepositoryResult<()>;
        fn set_superuser(&self, email: &UserEmail, is_superuser: bool) -> RepositoryResult<User>;
    }

    impl OrganizationReader for Repository {
        fn get_organization_by_id(
            &self,
            id: OrganizationId,
        ) -> RepositoryResult<Option<Organization>>;
        fn list_user_organizations(&self, user_id: UserId) -> RepositoryResult<Vec<Organization>>;
        fn list_all_organizations(&self) -> RepositoryResult<Vec<Organization>>;
    }

    impl OrganizationWriter for Repository {
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

    impl ProfileReader for Repository {
        fn get_profile_by_id(&self, id: ProfileId) -> RepositoryResult<Option<UserProfile>>;
        fn list_profiles_in_organization(
            &self,
            user_id: UserId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Vec<UserProfile>>;
        fn list_user_profiles(&self, user_id: UserId) -> RepositoryResult<Vec<UserProfile>>;
        fn list_organization_members(
            &self,
            organization_id: OrganizationId,
            profile_type: Option<ProfileType>,
        ) -> RepositoryResult<Vec<(UserProfile, User)>>;
    }

    impl ProfileWriter for Repository {
        fn create_or_activate_profile(
            &self,
            new_profile: &NewUserProfile,
        ) -> RepositoryResult<UserProfile>;
        fn remove_member(
            &self,
            user_id: UserId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<usize>;
    }

    impl RoleReader for Repository {
        fn list_permissions(&self) -> RepositoryResult<Vec<Permission>>;
        fn list_roles(
            &self,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Vec<RoleWithPermissions>>;
        fn get_role(
            &self,
            id: RoleId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<RoleWithPermissions>>;
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

    impl RoleWriter for Repository {
        fn create_role(&self, new_role: &NewRole) -> RepositoryResult<RoleWithPermissions>;
        fn replace_role_permissions(
            &self,
            id: RoleId,
            organization_id: OrganizationId,
            permissions: &[PermissionCode],
        ) -> RepositoryResult<RoleWithPermissions>;
        fn deactivate_role(&self, id: RoleId, organization_id: OrganizationId) -> RepositoryResult<()>;
        fn assign_role(&self, assignment: &NewUserRole) -> RepositoryResult<()>;
        fn revoke_role(
            &self,
            user_id: UserId,
            role_id: RoleId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<()>;
    }

    impl CustomerReader for Repository {
        fn get_customer_by_id(
            &self,
            id: CustomerId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<Customer>>;
        fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
    }

    impl CustomerWriter for Repository {
        fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
        fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize>;
        fn update_customer(
            &self,
            id: CustomerId,
            organization_id: OrganizationId,
            updates: &UpdateCustomer,
        ) -> RepositoryResult<Customer>;
        fn delete_customer(&self, id: CustomerId, organization_id: OrganizationId) -> RepositoryResult<()>;
    }

    impl LeadReader for Repository {
        fn get_lead_by_id(
            &self,
            id: LeadId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<Lead>>;
        fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
        fn lead_stats(&self, organization_id: OrganizationId) -> RepositoryResult<LeadStats>;
    }

    impl LeadWriter for Repository {
        fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
        fn update_lead(
            &self,
            id: LeadId,
            organization_id: OrganizationId,
            updates: &UpdateLead,
        ) -> RepositoryResult<Lead>;
        fn delete_lead(&self, id: LeadId, organization_id: OrganizationId) -> RepositoryResult<()>;
        fn convert_lead(
            &self,
            id: LeadId,
            organization_id: OrganizationId,
            deal: &NewDeal,
        ) -> RepositoryResult<(Lead, Deal)>;
    }

    impl DealReader for Repository {
        fn get_deal_by_id(
            &self,
            id: DealId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<Deal>>;
        fn list_deals(&self, query: DealListQuery) -> RepositoryResult<(usize, Vec<Deal>)>;
        fn deal_stats(&self, organization_id: OrganizationId) -> RepositoryResult<DealStats>;
    }

    impl DealWriter for Repository {
        fn create_deal(&self, new_deal: &NewDeal) -> RepositoryResult<Deal>;
        fn update_deal(
            &self,
            id: DealId,
            organization_id: OrganizationId,
            updates: &UpdateDeal,
        ) -> RepositoryResult<Deal>;
        fn delete_deal(&self, id: DealId, organization_id: OrganizationId) -> RepositoryResult<()>;
    }

    impl AuditReader for Repository {
        fn list_audit_events(
            &self,
            query: AuditListQuery,
        ) -> RepositoryResult<(usize, Vec<AuditEvent>)>;
    }

    impl AuditWriter for Repository {
        fn create_audit_event(&self, event: &NewAuditEvent) -> RepositoryResult<AuditEvent>;
    }
}
