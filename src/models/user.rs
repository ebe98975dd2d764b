//! Diesel models for users and their profiles.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{
    OrganizationId, ProfileId, ProfileType, TypeConstraintError, UserEmail, UserId, UserName,
};
use crate::domain::user::{
    NewUser as DomainNewUser, NewUserProfile as DomainNewUserProfile, User as DomainUser,
    UserProfile as DomainUserProfile,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub active_profile_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// Insertable form of [`User`].
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub is_superuser: bool,
    pub is_staff: bool,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::user_profiles)]
#[diesel(belongs_to(User, foreign_key = user_id))]
/// Diesel model for [`crate::domain::user::UserProfile`].
pub struct UserProfile {
    pub id: i32,
    pub user_id: i32,
    pub organization_id: Option<i32>,
    pub profile_type: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::user_profiles)]
/// Insertable form of [`UserProfile`].
pub struct NewUserProfile<'a> {
    pub user_id: i32,
    pub organization_id: Option<i32>,
    pub profile_type: &'a str,
    pub is_active: bool,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            email: UserEmail::new(user.email)?,
            name: UserName::new(user.name)?,
            is_superuser: user.is_superuser,
            is_staff: user.is_staff,
            is_active: user.is_active,
            active_profile_id: user.active_profile_id.map(ProfileId::try_from).transpose()?,
            created_at: user.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            email: user.email.as_str(),
            name: user.name.as_str(),
            is_superuser: user.is_superuser,
            is_staff: user.is_staff,
        }
    }
}

impl TryFrom<UserProfile> for DomainUserProfile {
    type Error = TypeConstraintError;

    fn try_from(profile: UserProfile) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProfileId::try_from(profile.id)?,
            user_id: UserId::try_from(profile.user_id)?,
            organization_id: profile
                .organization_id
                .map(OrganizationId::try_from)
                .transpose()?,
            profile_type: profile.profile_type.parse::<ProfileType>()?,
            is_active: profile.is_active,
            created_at: profile.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewUserProfile> for NewUserProfile<'a> {
    fn from(profile: &'a DomainNewUserProfile) -> Self {
        Self {
            user_id: profile.user_id.get(),
            organization_id: profile.organization_id.map(OrganizationId::get),
            profile_type: profile.profile_type.as_str(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn user_into_domain() {
        let now = Utc::now().naive_utc();
        let db = User {
            id: 4,
            email: "Bob@Example.com".into(),
            name: "Bob".into(),
            is_superuser: false,
            is_staff: true,
            is_active: true,
            active_profile_id: Some(9),
            created_at: now,
        };
        let domain = DomainUser::try_from(db).expect("valid user");
        assert_eq!(domain.id.get(), 4);
        assert_eq!(domain.email.as_str(), "bob@example.com");
        assert!(domain.is_staff);
        assert_eq!(domain.active_profile_id.map(ProfileId::get), Some(9));
    }

    #[test]
    fn profile_with_unknown_type_is_rejected() {
        let db = UserProfile {
            id: 1,
            user_id: 1,
            organization_id: Some(1),
            profile_type: "partner".into(),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        };
        assert!(DomainUserProfile::try_from(db).is_err());
    }

    #[test]
    fn new_profile_from_domain() {
        let domain = DomainNewUserProfile::new(
            UserId::new(2).expect("valid user id"),
            Some(OrganizationId::new(3).expect("valid org id")),
            ProfileType::Employee,
        );
        let new: NewUserProfile = (&domain).into();
        assert_eq!(new.user_id, 2);
        assert_eq!(new.organization_id, Some(3));
        assert_eq!(new.profile_type, "employee");
        assert!(new.is_active);
    }
}
