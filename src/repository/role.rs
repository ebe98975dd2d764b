//! Repository implementation for roles, the permission catalog and
//! role assignments.

use std::collections::BTreeMap;

use diesel::{Connection, prelude::*, upsert::excluded};

use crate::{
    domain::{
        role::{NewRole, NewUserRole, Permission, Role, RoleWithPermissions},
        types::{OrganizationId, PermissionCode, RoleId, UserId},
    },
    models::role::{
        NewRole as DbNewRole, Permission as DbPermission, Role as DbRole,
        RolePermission as DbRolePermission, UserRole as DbUserRole,
    },
    repository::{
        DieselRepository, RoleReader, RoleWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

/// Resolves catalog ids for the given codes.
fn permission_ids(
    conn: &mut SqliteConnection,
    codes: &[PermissionCode],
) -> RepositoryResult<Vec<i32>> {
    use crate::schema::permissions;

    let catalog = permissions::table.load::<DbPermission>(conn)?;
    let by_code = catalog
        .iter()
        .map(|p| -> RepositoryResult<(PermissionCode, i32)> { Ok((p.code()?, p.id)) })
        .collect::<RepositoryResult<BTreeMap<PermissionCode, i32>>>()?;

    codes
        .iter()
        .map(|code| {
            by_code.get(code).copied().ok_or_else(|| {
                RepositoryError::ValidationError(format!("permission `{code}` is not in the catalog"))
            })
        })
        .collect()
}

/// Loads the permissions of each role in `role_ids`.
fn permissions_by_role(
    conn: &mut SqliteConnection,
    role_ids: &[i32],
) -> RepositoryResult<BTreeMap<i32, Vec<PermissionCode>>> {
    use crate::schema::{permissions, role_permissions};

    let rows = role_permissions::table
        .inner_join(permissions::table)
        .filter(role_permissions::role_id.eq_any(role_ids))
        .select((role_permissions::role_id, DbPermission::as_select()))
        .order((permissions::resource.asc(), permissions::id.asc()))
        .load::<(i32, DbPermission)>(conn)?;

    let mut grouped: BTreeMap<i32, Vec<PermissionCode>> = BTreeMap::new();
    for (role_id, permission) in rows {
        grouped.entry(role_id).or_default().push(permission.code()?);
    }
    for codes in grouped.values_mut() {
        codes.sort_unstable();
    }
    Ok(grouped)
}

fn with_permissions(
    conn: &mut SqliteConnection,
    role: DbRole,
) -> RepositoryResult<RoleWithPermissions> {
    let mut grouped = permissions_by_role(conn, &[role.id])?;
    let permissions = grouped.remove(&role.id).unwrap_or_default();
    Ok(RoleWithPermissions {
        role: Role::try_from(role)?,
        permissions,
    })
}

fn set_role_permissions(
    conn: &mut SqliteConnection,
    role_id: i32,
    codes: &[PermissionCode],
) -> RepositoryResult<()> {
    use crate::schema::role_permissions;

    let ids = permission_ids(conn, codes)?;

    diesel::delete(role_permissions::table.filter(role_permissions::role_id.eq(role_id)))
        .execute(conn)?;

    let rows = ids
        .into_iter()
        .map(|permission_id| DbRolePermission {
            role_id,
            permission_id,
        })
        .collect::<Vec<_>>();

    if !rows.is_empty() {
        diesel::insert_into(role_permissions::table)
            .values(&rows)
            .execute(conn)?;
    }

    Ok(())
}

/// Inserts a role with its permissions inside the caller's transaction.
///
/// A deactivated role with the same name is revived instead of inserted.
pub(super) fn insert_role(
    conn: &mut SqliteConnection,
    new_role: &NewRole,
) -> RepositoryResult<RoleWithPermissions> {
    use crate::schema::roles;

    let existing = roles::table
        .filter(roles::organization_id.eq(new_role.organization_id.get()))
        .filter(roles::name.eq(new_role.name.as_str()))
        .first::<DbRole>(conn)
        .optional()?;

    let role = match existing {
        Some(role) if role.is_active => {
            return Err(RepositoryError::ConstraintViolation(format!(
                "role `{}` already exists",
                new_role.name
            )));
        }
        Some(role) => diesel::update(roles::table.find(role.id))
            .set((
                roles::is_active.eq(true),
                roles::description.eq(new_role.description.as_deref()),
            ))
            .get_result::<DbRole>(conn)?,
        None => diesel::insert_into(roles::table)
            .values(&DbNewRole {
                organization_id: new_role.organization_id.get(),
                name: new_role.name.as_str(),
                description: new_role.description.as_deref(),
            })
            .get_result::<DbRole>(conn)?,
    };

    set_role_permissions(conn, role.id, &new_role.permissions)?;
    with_permissions(conn, role)
}

fn find_active_role(
    conn: &mut SqliteConnection,
    id: RoleId,
    organization_id: OrganizationId,
) -> RepositoryResult<DbRole> {
    use crate::schema::roles;

    roles::table
        .find(id.get())
        .filter(roles::organization_id.eq(organization_id.get()))
        .filter(roles::is_active.eq(true))
        .first::<DbRole>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)
}

impl RoleReader for DieselRepository {
    fn list_permissions(&self) -> RepositoryResult<Vec<Permission>> {
        use crate::schema::permissions;

        let mut conn = self.conn()?;

        let permissions = permissions::table
            .order(permissions::id.asc())
            .load::<DbPermission>(&mut conn)?;

        permissions
            .into_iter()
            .map(|p| Permission::try_from(p).map_err(RepositoryError::from))
            .collect()
    }

    fn list_roles(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<RoleWithPermissions>> {
        use crate::schema::roles;

        let mut conn = self.conn()?;

        let roles = roles::table
            .filter(roles::organization_id.eq(organization_id.get()))
            .filter(roles::is_active.eq(true))
            .order(roles::name.asc())
            .load::<DbRole>(&mut conn)?;

        let role_ids = roles.iter().map(|r| r.id).collect::<Vec<_>>();
        let mut grouped = permissions_by_role(&mut conn, &role_ids)?;

        roles
            .into_iter()
            .map(|role| -> RepositoryResult<RoleWithPermissions> {
                let permissions = grouped.remove(&role.id).unwrap_or_default();
                Ok(RoleWithPermissions {
                    role: Role::try_from(role)?,
                    permissions,
                })
            })
            .collect()
    }

    fn get_role(
        &self,
        id: RoleId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<RoleWithPermissions>> {
        let mut conn = self.conn()?;

        match find_active_role(&mut conn, id, organization_id) {
            Ok(role) => with_permissions(&mut conn, role).map(Some),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list_user_permissions(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<PermissionCode>> {
        use crate::schema::{permissions, role_permissions, roles, user_roles};

        let mut conn = self.conn()?;

        let rows = permissions::table
            .inner_join(role_permissions::table)
            .inner_join(roles::table.on(roles::id.eq(role_permissions::role_id)))
            .inner_join(user_roles::table.on(user_roles::role_id.eq(roles::id)))
            .filter(user_roles::user_id.eq(user_id.get()))
            .filter(user_roles::organization_id.eq(organization_id.get()))
            .filter(user_roles::is_active.eq(true))
            .filter(roles::organization_id.eq(organization_id.get()))
            .filter(roles::is_active.eq(true))
            .select(DbPermission::as_select())
            .distinct()
            .load::<DbPermission>(&mut conn)?;

        let mut codes = rows
            .iter()
            .map(|p| p.code().map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;
        codes.sort_unstable();
        Ok(codes)
    }

    fn list_user_roles(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<Role>> {
        use crate::schema::{roles, user_roles};

        let mut conn = self.conn()?;

        let roles = roles::table
            .inner_join(user_roles::table)
            .filter(user_roles::user_id.eq(user_id.get()))
            .filter(user_roles::is_active.eq(true))
            .filter(roles::organization_id.eq(organization_id.get()))
            .filter(roles::is_active.eq(true))
            .order(roles::name.asc())
            .select(DbRole::as_select())
            .load::<DbRole>(&mut conn)?;

        roles
            .into_iter()
            .map(|r| Role::try_from(r).map_err(RepositoryError::from))
            .collect()
    }
}

impl RoleWriter for DieselRepository {
    fn create_role(&self, new_role: &NewRole) -> RepositoryResult<RoleWithPermissions> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| insert_role(conn, new_role))
    }

    fn replace_role_permissions(
        &self,
        id: RoleId,
        organization_id: OrganizationId,
        permissions: &[PermissionCode],
    ) -> RepositoryResult<RoleWithPermissions> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let role = find_active_role(conn, id, organization_id)?;
            set_role_permissions(conn, role.id, permissions)?;
            with_permissions(conn, role)
        })
    }

    fn deactivate_role(&self, id: RoleId, organization_id: OrganizationId) -> RepositoryResult<()> {
        use crate::schema::{roles, user_roles};

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let role = find_active_role(conn, id, organization_id)?;

            diesel::update(roles::table.find(role.id))
                .set(roles::is_active.eq(false))
                .execute(conn)?;

            diesel::update(user_roles::table.filter(user_roles::role_id.eq(role.id)))
                .set(user_roles::is_active.eq(false))
                .execute(conn)?;

            Ok(())
        })
    }

    fn assign_role(&self, assignment: &NewUserRole) -> RepositoryResult<()> {
        use crate::schema::user_roles;

        let mut conn = self.conn()?;

        let role = find_active_role(&mut conn, assignment.role_id, assignment.organization_id)?;

        diesel::insert_into(user_roles::table)
            .values(&DbUserRole {
                user_id: assignment.user_id.get(),
                role_id: role.id,
                organization_id: role.organization_id,
                is_active: true,
            })
            .on_conflict((user_roles::user_id, user_roles::role_id))
            .do_update()
            .set(user_roles::is_active.eq(excluded(user_roles::is_active)))
            .execute(&mut conn)?;

        Ok(())
    }

    fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()> {
        use crate::schema::user_roles;

        let mut conn = self.conn()?;

        let affected = diesel::update(
            user_roles::table
                .filter(user_roles::user_id.eq(user_id.get()))
                .filter(user_roles::role_id.eq(role_id.get()))
                .filter(user_roles::organization_id.eq(organization_id.get()))
                .filter(user_roles::is_active.eq(true)),
        )
        .set(user_roles::is_active.eq(false))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
