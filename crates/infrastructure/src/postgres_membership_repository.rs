use async_trait::async_trait;
use sanatio_application::{MemberRole, MembershipRepository, OrganizationRepository};
use sanatio_core::{AppError, AppResult, OrganizationId};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// PostgreSQL-backed organization membership repository.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MemberRoleRow {
    is_owner: bool,
    role_name: Option<String>,
    stored_role_name: Option<String>,
    permissions_document: Option<String>,
}

impl From<MemberRoleRow> for MemberRole {
    fn from(row: MemberRoleRow) -> Self {
        if row.is_owner {
            return Self::Owner;
        }

        match row.role_name {
            None => Self::Unassigned,
            Some(role_name) => Self::Assigned {
                role_name: row.stored_role_name.unwrap_or(role_name),
                permissions_document: row.permissions_document,
            },
        }
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn find_member_role(
        &self,
        organization_id: OrganizationId,
        subject: &str,
    ) -> AppResult<Option<MemberRole>> {
        let row = sqlx::query_as::<_, MemberRoleRow>(
            r#"
            SELECT
                members.is_owner,
                members.role_name,
                roles.name AS stored_role_name,
                roles.permissions_document
            FROM organization_members AS members
            LEFT JOIN organization_roles AS roles
                ON roles.organization_id = members.organization_id
                AND lower(roles.name) = lower(members.role_name)
            WHERE members.organization_id = $1
                AND members.subject = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve member role: {error}"))
        })?;

        Ok(row.map(MemberRole::from))
    }

    async fn find_default_organization(&self, subject: &str) -> AppResult<Option<OrganizationId>> {
        let organization_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT organization_id
            FROM organization_members
            WHERE subject = $1
            ORDER BY joined_at, organization_id
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve organization membership: {error}"))
        })?;

        Ok(organization_id.map(OrganizationId::from_uuid))
    }
}

#[async_trait]
impl OrganizationRepository for PostgresMembershipRepository {
    async fn ensure_membership_for_subject(
        &self,
        subject: &str,
        display_name: &str,
        preferred_organization_id: Option<OrganizationId>,
    ) -> AppResult<OrganizationId> {
        if let Some(organization_id) = self.find_default_organization(subject).await? {
            return Ok(organization_id);
        }

        let organization_id = preferred_organization_id.unwrap_or_default();
        let organization_name = format!("{display_name}'s organization");

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(organization_name)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to ensure organization exists: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, subject, display_name, is_owner)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (organization_id, subject) DO NOTHING
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(subject)
        .bind(display_name)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to ensure owner membership exists: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        self.find_default_organization(subject)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "subject '{subject}' membership was not persisted after bootstrap"
                ))
            })
    }

    async fn add_member(
        &self,
        organization_id: OrganizationId,
        subject: &str,
        display_name: &str,
        role_name: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, subject, display_name, role_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (organization_id, subject) DO NOTHING
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(subject)
        .bind(display_name)
        .bind(role_name)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to add member: {error}")))?;

        Ok(())
    }
}
