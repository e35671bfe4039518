use async_trait::async_trait;
use sanatio_core::{AppResult, OrganizationId};
use sanatio_domain::PermissionSet;

/// Role row as persisted, with its permission document still serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRole {
    /// Role name in organization scope.
    pub name: String,
    /// Serialized permission document.
    pub permissions_document: Option<String>,
}

/// Role definition returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Role name in organization scope.
    pub name: String,
    /// Decoded role grants.
    pub permissions: PermissionSet,
}

/// Input payload for creating or replacing a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRoleInput {
    /// Role name in organization scope.
    pub name: String,
    /// Grants to store with the role.
    pub permissions: PermissionSet,
}

/// Repository port for role administration.
///
/// Role names are compared case-insensitively within one organization.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists the roles of an organization ordered by name.
    async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<StoredRole>>;

    /// Finds one role by name.
    async fn find_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
    ) -> AppResult<Option<StoredRole>>;

    /// Creates the role or replaces its permission document.
    async fn save_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
        permissions_document: &str,
    ) -> AppResult<()>;

    /// Deletes a role no member holds.
    ///
    /// The membership check and the delete are one atomic step. Fails with
    /// `NotFound` for an unknown role and `Conflict` while members hold it.
    async fn delete_role(&self, organization_id: OrganizationId, role_name: &str)
    -> AppResult<()>;

    /// Assigns an existing role to a non-owner member.
    ///
    /// The member stores the role's canonical name. The role cannot be
    /// deleted between the existence check and the update. Fails with
    /// `NotFound` when either the role or the member is missing.
    async fn assign_member_role(
        &self,
        organization_id: OrganizationId,
        member_subject: &str,
        role_name: &str,
    ) -> AppResult<()>;
}
