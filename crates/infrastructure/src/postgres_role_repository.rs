use async_trait::async_trait;
use sanatio_application::{RoleRepository, StoredRole};
use sanatio_core::{AppError, AppResult, OrganizationId};
use sqlx::{FromRow, PgPool};
use tracing::debug;

/// PostgreSQL-backed repository for organization roles.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    name: String,
    permissions_document: Option<String>,
}

impl From<RoleRow> for StoredRole {
    fn from(row: RoleRow) -> Self {
        Self {
            name: row.name,
            permissions_document: row.permissions_document,
        }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<StoredRole>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, permissions_document
            FROM organization_roles
            WHERE organization_id = $1
            ORDER BY lower(name)
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(rows.into_iter().map(StoredRole::from).collect())
    }

    async fn find_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
    ) -> AppResult<Option<StoredRole>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, permissions_document
            FROM organization_roles
            WHERE organization_id = $1
                AND lower(name) = lower($2)
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(role_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        Ok(row.map(StoredRole::from))
    }

    async fn save_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
        permissions_document: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO organization_roles (organization_id, name, permissions_document)
            VALUES ($1, $2, $3)
            ON CONFLICT (organization_id, lower(name))
            DO UPDATE SET
                name = EXCLUDED.name,
                permissions_document = EXCLUDED.permissions_document,
                updated_at = NOW()
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(role_name)
        .bind(permissions_document)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save role: {error}")))?;

        debug!(%organization_id, role = role_name, "role document stored");
        Ok(())
    }

    async fn delete_role(&self, organization_id: OrganizationId, role_name: &str) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start role delete transaction for organization '{organization_id}': {error}"
            ))
        })?;

        // Row lock conflicts with the share lock taken by assign_member_role.
        let stored_name = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM organization_roles
            WHERE organization_id = $1
                AND lower(name) = lower($2)
            FOR UPDATE
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(role_name)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' not found")))?;

        let holders = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM organization_members
            WHERE organization_id = $1
                AND lower(role_name) = lower($2)
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(role_name)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count role members: {error}")))?;

        if holders > 0 {
            return Err(AppError::Conflict(format!(
                "role '{stored_name}' is still assigned to {holders} member(s)"
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM organization_roles
            WHERE organization_id = $1
                AND lower(name) = lower($2)
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(role_name)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit role delete: {error}"))
        })?;

        debug!(%organization_id, role = stored_name.as_str(), "role row deleted");
        Ok(())
    }

    async fn assign_member_role(
        &self,
        organization_id: OrganizationId,
        member_subject: &str,
        role_name: &str,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start role assignment transaction for organization '{organization_id}': {error}"
            ))
        })?;

        let stored_name = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM organization_roles
            WHERE organization_id = $1
                AND lower(name) = lower($2)
            FOR SHARE
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(role_name)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' not found")))?;

        let result = sqlx::query(
            r#"
            UPDATE organization_members
            SET role_name = $3
            WHERE organization_id = $1
                AND subject = $2
                AND NOT is_owner
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(member_subject)
        .bind(stored_name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "assignable member '{member_subject}' not found"
            )));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit role assignment: {error}"))
        })?;

        Ok(())
    }
}
