use async_trait::async_trait;
use sanatio_core::{AppResult, OrganizationId};

/// Role a member holds inside one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRole {
    /// Organization owner; not backed by a stored permission document.
    Owner,
    /// Member without any role yet.
    Unassigned,
    /// Member assigned to a named role.
    Assigned {
        /// Role name in organization scope.
        role_name: String,
        /// Serialized permission document stored with the role, if any.
        permissions_document: Option<String>,
    },
}

/// Repository port for organization membership lookups.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Finds the role a subject holds in an organization.
    ///
    /// Returns `None` when the subject is not a member.
    async fn find_member_role(
        &self,
        organization_id: OrganizationId,
        subject: &str,
    ) -> AppResult<Option<MemberRole>>;

    /// Returns the organization a subject joined first, if any.
    async fn find_default_organization(&self, subject: &str) -> AppResult<Option<OrganizationId>>;
}

/// Repository port for provisioning organizations and their staff.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Returns the subject's first organization, creating one owned by the
    /// subject when it has no membership yet.
    async fn ensure_membership_for_subject(
        &self,
        subject: &str,
        display_name: &str,
        preferred_organization_id: Option<OrganizationId>,
    ) -> AppResult<OrganizationId>;

    /// Adds a staff member, optionally with a role; no-op when already a member.
    async fn add_member(
        &self,
        organization_id: OrganizationId,
        subject: &str,
        display_name: &str,
        role_name: Option<&str>,
    ) -> AppResult<()>;
}
