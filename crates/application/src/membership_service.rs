use std::sync::Arc;

use sanatio_core::{AppError, AppResult, OrganizationId};
use tracing::info;

use crate::{MembershipRepository, OrganizationRepository};

/// Application service answering organization membership questions at sign-in.
#[derive(Clone)]
pub struct MembershipService {
    membership_repository: Arc<dyn MembershipRepository>,
    organization_repository: Arc<dyn OrganizationRepository>,
}

impl MembershipService {
    /// Creates a new membership service.
    #[must_use]
    pub fn new(
        membership_repository: Arc<dyn MembershipRepository>,
        organization_repository: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            membership_repository,
            organization_repository,
        }
    }

    /// Resolves the organization a subject becomes active in after signing in.
    ///
    /// A requested organization must already list the subject as a member.
    /// Without a request the subject's first organization is used, and a
    /// subject without any membership is provisioned as owner of a new one.
    pub async fn sign_in_organization(
        &self,
        subject: &str,
        display_name: &str,
        requested: Option<OrganizationId>,
    ) -> AppResult<OrganizationId> {
        if let Some(organization_id) = requested {
            self.require_membership(organization_id, subject).await?;
            return Ok(organization_id);
        }

        if let Some(organization_id) = self
            .membership_repository
            .find_default_organization(subject)
            .await?
        {
            return Ok(organization_id);
        }

        let organization_id = self
            .organization_repository
            .ensure_membership_for_subject(subject, display_name, None)
            .await?;
        info!(%organization_id, subject, "provisioned organization for new subject");

        Ok(organization_id)
    }

    /// Ensures the subject belongs to the organization.
    pub async fn require_membership(
        &self,
        organization_id: OrganizationId,
        subject: &str,
    ) -> AppResult<()> {
        let member_role = self
            .membership_repository
            .find_member_role(organization_id, subject)
            .await?;

        if member_role.is_none() {
            return Err(AppError::Forbidden(format!(
                "subject '{subject}' is not a member of organization '{organization_id}'"
            )));
        }

        Ok(())
    }
}
