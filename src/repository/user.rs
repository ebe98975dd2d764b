//! Repository implementation for users and their profiles.

use diesel::{Connection, prelude::*, upsert::excluded};

use crate::{
    domain::{
        types::{OrganizationId, ProfileId, ProfileType, UserEmail, UserId},
        user::{NewUser, NewUserProfile, User, UserProfile},
    },
    models::user::{
        NewUser as DbNewUser, NewUserProfile as DbNewUserProfile, User as DbUser,
        UserProfile as DbUserProfile,
    },
    repository::{
        DieselRepository, ProfileReader, ProfileWriter, UserReader, UserWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .find(id.get())
            .first::<DbUser>(&mut conn)
            .optional()?;

        user.map(User::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::email.eq(email.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        user.map(User::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }
}

impl UserWriter for DieselRepository {
    fn get_or_create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_new_user: DbNewUser = new_user.into();

        diesel::insert_into(users::table)
            .values(&db_new_user)
            .on_conflict(users::email)
            .do_nothing()
            .execute(&mut conn)?;

        let user = users::table
            .filter(users::email.eq(new_user.email.as_str()))
            .first::<DbUser>(&mut conn)?;

        User::try_from(user).map_err(RepositoryError::from)
    }

    fn set_active_profile(
        &self,
        user_id: UserId,
        profile_id: Option<ProfileId>,
    ) -> RepositoryResult<()> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let affected = diesel::update(users::table.find(user_id.get()))
            .set(users::active_profile_id.eq(profile_id.map(ProfileId::get)))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn set_superuser(&self, email: &UserEmail, is_superuser: bool) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = diesel::update(users::table.filter(users::email.eq(email.as_str())))
            .set(users::is_superuser.eq(is_superuser))
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(user).map_err(RepositoryError::from)
    }
}

impl ProfileReader for DieselRepository {
    fn get_profile_by_id(&self, id: ProfileId) -> RepositoryResult<Option<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let profile = user_profiles::table
            .find(id.get())
            .first::<DbUserProfile>(&mut conn)
            .optional()?;

        profile
            .map(UserProfile::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_profiles_in_organization(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let profiles = user_profiles::table
            .filter(user_profiles::user_id.eq(user_id.get()))
            .filter(user_profiles::organization_id.eq(organization_id.get()))
            .filter(user_profiles::is_active.eq(true))
            .order(user_profiles::id.asc())
            .load::<DbUserProfile>(&mut conn)?;

        profiles
            .into_iter()
            .map(|p| UserProfile::try_from(p).map_err(RepositoryError::from))
            .collect()
    }

    fn list_user_profiles(&self, user_id: UserId) -> RepositoryResult<Vec<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let profiles = user_profiles::table
            .filter(user_profiles::user_id.eq(user_id.get()))
            .order(user_profiles::id.asc())
            .load::<DbUserProfile>(&mut conn)?;

        profiles
            .into_iter()
            .map(|p| UserProfile::try_from(p).map_err(RepositoryError::from))
            .collect()
    }

    fn list_organization_members(
        &self,
        organization_id: OrganizationId,
        profile_type: Option<ProfileType>,
    ) -> RepositoryResult<Vec<(UserProfile, User)>> {
        use crate::schema::{user_profiles, users};

        let mut conn = self.conn()?;

        let mut query = user_profiles::table
            .inner_join(users::table)
            .filter(user_profiles::organization_id.eq(organization_id.get()))
            .filter(user_profiles::is_active.eq(true))
            .select((DbUserProfile::as_select(), DbUser::as_select()))
            .into_boxed();

        if let Some(profile_type) = profile_type {
            query = query.filter(user_profiles::profile_type.eq(profile_type.as_str()));
        }

        let rows = query
            .order((users::name.asc(), user_profiles::id.asc()))
            .load::<(DbUserProfile, DbUser)>(&mut conn)?;

        rows.into_iter()
            .map(|(profile, user)| -> RepositoryResult<(UserProfile, User)> {
                Ok((UserProfile::try_from(profile)?, User::try_from(user)?))
            })
            .collect()
    }
}

impl ProfileWriter for DieselRepository {
    fn create_or_activate_profile(
        &self,
        new_profile: &NewUserProfile,
    ) -> RepositoryResult<UserProfile> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;
        let db_new_profile: DbNewUserProfile = new_profile.into();

        let profile = diesel::insert_into(user_profiles::table)
            .values(&db_new_profile)
            .on_conflict((
                user_profiles::user_id,
                user_profiles::organization_id,
                user_profiles::profile_type,
            ))
            .do_update()
            .set(user_profiles::is_active.eq(excluded(user_profiles::is_active)))
            .get_result::<DbUserProfile>(&mut conn)?;

        UserProfile::try_from(profile).map_err(RepositoryError::from)
    }

    fn remove_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<usize> {
        use crate::schema::{user_profiles, user_roles, users};

        let mut conn = self.conn()?;

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            let profile_ids = user_profiles::table
                .filter(user_profiles::user_id.eq(user_id.get()))
                .filter(user_profiles::organization_id.eq(organization_id.get()))
                .filter(user_profiles::is_active.eq(true))
                .select(user_profiles::id)
                .load::<i32>(conn)?;

            let profiles = diesel::update(
                user_profiles::table.filter(user_profiles::id.eq_any(&profile_ids)),
            )
            .set(user_profiles::is_active.eq(false))
            .execute(conn)?;

            diesel::update(
                user_roles::table
                    .filter(user_roles::user_id.eq(user_id.get()))
                    .filter(user_roles::organization_id.eq(organization_id.get())),
            )
            .set(user_roles::is_active.eq(false))
            .execute(conn)?;

            diesel::update(
                users::table
                    .find(user_id.get())
                    .filter(users::active_profile_id.eq_any(&profile_ids)),
            )
            .set(users::active_profile_id.eq(None::<i32>))
            .execute(conn)?;

            Ok(profiles)
        })
        .map_err(RepositoryError::from)
    }
}
