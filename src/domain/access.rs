//! Request-scoped access information and the implicit grant rules.
//!
//! A user is allowed everything inside an organization when they are a
//! superuser, staff, the organization owner, or hold an active vendor profile
//! in it. Everyone else is limited to the permissions of their active roles.

use serde::Serialize;

use crate::domain::organization::Organization;
use crate::domain::types::{OrganizationId, ProfileType};
use crate::domain::user::{User, UserProfile};

/// Reason a user holds every permission in an organization.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImplicitGrant {
    Superuser,
    Staff,
    Owner,
    Vendor,
}

/// Evaluates the implicit grant rules in precedence order.
pub fn implicit_grant(
    user: &User,
    organization: &Organization,
    profile: Option<&UserProfile>,
) -> Option<ImplicitGrant> {
    if !user.is_active {
        return None;
    }
    if user.is_superuser {
        return Some(ImplicitGrant::Superuser);
    }
    if user.is_staff {
        return Some(ImplicitGrant::Staff);
    }
    if organization.is_owned_by(user.id) {
        return Some(ImplicitGrant::Owner);
    }
    match profile {
        Some(profile)
            if profile.user_id == user.id
                && profile.profile_type == ProfileType::Vendor
                && profile.is_member_of(organization.id) =>
        {
            Some(ImplicitGrant::Vendor)
        }
        _ => None,
    }
}

/// Whether the user may enter the organization at all.
pub fn can_access_organization(
    user: &User,
    organization: &Organization,
    profile: Option<&UserProfile>,
) -> bool {
    user.is_active
        && (user.is_superuser
            || user.is_staff
            || organization.is_owned_by(user.id)
            || profile.is_some_and(|p| p.user_id == user.id && p.is_member_of(organization.id)))
}

/// Identity and tenant resolved for the current request.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AccessContext {
    pub user: User,
    pub organization: Option<Organization>,
    /// The user's profile inside `organization`, when they hold one.
    pub profile: Option<UserProfile>,
}

impl AccessContext {
    pub fn new(user: User) -> Self {
        Self {
            user,
            organization: None,
            profile: None,
        }
    }

    #[must_use]
    pub fn with_organization(
        mut self,
        organization: Organization,
        profile: Option<UserProfile>,
    ) -> Self {
        self.organization = Some(organization);
        self.profile = profile;
        self
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization.as_ref().map(|org| org.id)
    }

    pub fn implicit_grant(&self) -> Option<ImplicitGrant> {
        self.organization
            .as_ref()
            .and_then(|org| implicit_grant(&self.user, org, self.profile.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{
        OrganizationName, ProfileId, UserEmail, UserId, UserName,
    };

    fn user(id: i32) -> User {
        User {
            id: UserId::new(id).expect("valid user id"),
            email: UserEmail::new(format!("user{id}@example.com")).expect("valid email"),
            name: UserName::new("User").expect("valid name"),
            is_superuser: false,
            is_staff: false,
            is_active: true,
            active_profile_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn organization(id: i32, owner: Option<i32>) -> Organization {
        Organization {
            id: OrganizationId::new(id).expect("valid org id"),
            name: OrganizationName::new("Acme").expect("valid name"),
            owner_id: owner.map(|o| UserId::new(o).expect("valid owner id")),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn profile(user_id: i32, org: Option<i32>, profile_type: ProfileType) -> UserProfile {
        UserProfile {
            id: ProfileId::new(1).expect("valid profile id"),
            user_id: UserId::new(user_id).expect("valid user id"),
            organization_id: org.map(|o| OrganizationId::new(o).expect("valid org id")),
            profile_type,
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn superuser_and_staff_are_granted_everywhere() {
        let org = organization(1, None);

        let mut admin = user(1);
        admin.is_superuser = true;
        admin.is_staff = true;
        assert_eq!(implicit_grant(&admin, &org, None), Some(ImplicitGrant::Superuser));

        let mut staff = user(2);
        staff.is_staff = true;
        assert_eq!(implicit_grant(&staff, &org, None), Some(ImplicitGrant::Staff));
    }

    #[test]
    fn owner_is_granted_without_profile() {
        let org = organization(1, Some(5));
        assert_eq!(implicit_grant(&user(5), &org, None), Some(ImplicitGrant::Owner));
        assert_eq!(implicit_grant(&user(6), &org, None), None);
    }

    #[test]
    fn vendor_profile_grants_only_its_organization() {
        let org = organization(1, None);
        let other = organization(2, None);
        let vendor = profile(3, Some(1), ProfileType::Vendor);

        assert_eq!(
            implicit_grant(&user(3), &org, Some(&vendor)),
            Some(ImplicitGrant::Vendor)
        );
        assert_eq!(implicit_grant(&user(3), &other, Some(&vendor)), None);
    }

    #[test]
    fn employee_and_inactive_profiles_get_no_implicit_grant() {
        let org = organization(1, None);
        let employee = profile(3, Some(1), ProfileType::Employee);
        assert_eq!(implicit_grant(&user(3), &org, Some(&employee)), None);

        let mut vendor = profile(3, Some(1), ProfileType::Vendor);
        vendor.is_active = false;
        assert_eq!(implicit_grant(&user(3), &org, Some(&vendor)), None);
    }

    #[test]
    fn inactive_users_lose_every_grant() {
        let org = organization(1, Some(1));
        let mut owner = user(1);
        owner.is_superuser = true;
        owner.is_active = false;
        assert_eq!(implicit_grant(&owner, &org, None), None);
        assert!(!can_access_organization(&owner, &org, None));
    }

    #[test]
    fn employees_can_access_but_strangers_cannot() {
        let org = organization(1, Some(9));
        let employee = profile(3, Some(1), ProfileType::Employee);
        assert!(can_access_organization(&user(3), &org, Some(&employee)));
        assert!(!can_access_organization(&user(4), &org, None));
        // Profile belonging to somebody else does not count.
        assert!(!can_access_organization(&user(4), &org, Some(&employee)));
    }
}
