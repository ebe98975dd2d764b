//! Repository implementation for organizations.

use diesel::{Connection, prelude::*};

use crate::{
    domain::{
        organization::{NewOrganization, Organization},
        role::RoleTemplate,
        types::{OrganizationId, OrganizationName, ProfileType, UserId},
        user::{NewUserProfile, UserProfile},
    },
    models::{
        organization::{NewOrganization as DbNewOrganization, Organization as DbOrganization},
        user::{NewUserProfile as DbNewUserProfile, UserProfile as DbUserProfile},
    },
    repository::{
        DieselRepository, OrganizationReader, OrganizationWriter,
        errors::{RepositoryError, RepositoryResult},
        role::insert_role,
    },
};

impl OrganizationReader for DieselRepository {
    fn get_organization_by_id(
        &self,
        id: OrganizationId,
    ) -> RepositoryResult<Option<Organization>> {
        use crate::schema::organizations;

        let mut conn = self.conn()?;

        let organization = organizations::table
            .find(id.get())
            .first::<DbOrganization>(&mut conn)
            .optional()?;

        organization
            .map(Organization::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_user_organizations(&self, user_id: UserId) -> RepositoryResult<Vec<Organization>> {
        use crate::schema::{organizations, user_profiles};

        let mut conn = self.conn()?;

        let member_of = user_profiles::table
            .filter(user_profiles::user_id.eq(user_id.get()))
            .filter(user_profiles::is_active.eq(true))
            .select(user_profiles::organization_id);

        let organizations = organizations::table
            .filter(organizations::is_active.eq(true))
            .filter(
                organizations::owner_id
                    .eq(user_id.get())
                    .or(organizations::id.nullable().eq_any(member_of)),
            )
            .order(organizations::id.asc())
            .load::<DbOrganization>(&mut conn)?;

        organizations
            .into_iter()
            .map(|o| Organization::try_from(o).map_err(RepositoryError::from))
            .collect()
    }

    fn list_all_organizations(&self) -> RepositoryResult<Vec<Organization>> {
        use crate::schema::organizations;

        let mut conn = self.conn()?;

        let organizations = organizations::table
            .filter(organizations::is_active.eq(true))
            .order(organizations::id.asc())
            .load::<DbOrganization>(&mut conn)?;

        organizations
            .into_iter()
            .map(|o| Organization::try_from(o).map_err(RepositoryError::from))
            .collect()
    }
}

impl OrganizationWriter for DieselRepository {
    fn create_organization(
        &self,
        new_organization: &NewOrganization,
        roles: &[RoleTemplate],
    ) -> RepositoryResult<(Organization, UserProfile)> {
        use crate::schema::{organizations, user_profiles, users};

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let db_new_organization: DbNewOrganization = new_organization.into();
            let organization = diesel::insert_into(organizations::table)
                .values(&db_new_organization)
                .get_result::<DbOrganization>(conn)?;
            let organization = Organization::try_from(organization)?;

            let new_profile = NewUserProfile::new(
                new_organization.owner_id,
                Some(organization.id),
                ProfileType::Vendor,
            );
            let db_new_profile: DbNewUserProfile = (&new_profile).into();
            let profile = diesel::insert_into(user_profiles::table)
                .values(&db_new_profile)
                .get_result::<DbUserProfile>(conn)?;
            let profile = UserProfile::try_from(profile)?;

            diesel::update(users::table.find(new_organization.owner_id.get()))
                .set(users::active_profile_id.eq(profile.id.get()))
                .execute(conn)?;

            for template in roles {
                insert_role(conn, &template.clone().into_new_role(organization.id))?;
            }

            Ok((organization, profile))
        })
    }

    fn update_organization_name(
        &self,
        id: OrganizationId,
        name: &OrganizationName,
    ) -> RepositoryResult<Organization> {
        use crate::schema::organizations;

        let mut conn = self.conn()?;

        let organization = diesel::update(organizations::table.find(id.get()))
            .set(organizations::name.eq(name.as_str()))
            .get_result::<DbOrganization>(&mut conn)?;

        Organization::try_from(organization).map_err(RepositoryError::from)
    }
}
