use std::sync::Arc;

use sanatio_core::{AppResult, OrganizationId, UserIdentity};
use sanatio_domain::{Ability, PermissionSet, SubjectCatalog};
use tracing::{debug, warn};

use crate::{MemberRole, MembershipRepository};

/// Application service resolving the effective ability of a caller.
///
/// Abilities are rebuilt for every call; nothing is cached between requests.
#[derive(Clone)]
pub struct AbilityService {
    repository: Arc<dyn MembershipRepository>,
    catalog: Arc<SubjectCatalog>,
}

impl AbilityService {
    /// Creates a new ability service.
    #[must_use]
    pub fn new(repository: Arc<dyn MembershipRepository>, catalog: Arc<SubjectCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Returns the master subject catalog.
    #[must_use]
    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    /// Compiles the ability of an authenticated identity in its active organization.
    ///
    /// Owners receive every catalog grant, members receive their role's
    /// stored grants, and non-members receive nothing.
    pub async fn resolve_for(&self, identity: &UserIdentity) -> AppResult<Ability> {
        let organization_id = identity.organization_id();
        let member_role = self
            .repository
            .find_member_role(organization_id, identity.subject())
            .await?;

        let ability = match member_role {
            Some(MemberRole::Owner) => Ability::owner(&self.catalog),
            Some(MemberRole::Assigned {
                role_name,
                permissions_document,
            }) => {
                let permission_set = decode_stored_permissions(
                    organization_id,
                    &role_name,
                    permissions_document.as_deref(),
                );
                Ability::compile(Some(&permission_set))
            }
            Some(MemberRole::Unassigned) => Ability::empty(),
            None => {
                debug!(
                    %organization_id,
                    subject = identity.subject(),
                    "subject has no membership in active organization"
                );
                Ability::empty()
            }
        };

        Ok(ability)
    }
}

/// Decodes a stored role document, failing closed to an empty set.
pub(crate) fn decode_stored_permissions(
    organization_id: OrganizationId,
    role_name: &str,
    document: Option<&str>,
) -> PermissionSet {
    let Some(document) = document else {
        return PermissionSet::new();
    };

    match PermissionSet::parse_document(document) {
        Ok(parsed) => {
            if !parsed.ignored_entries.is_empty() {
                warn!(
                    %organization_id,
                    role = role_name,
                    ignored = ?parsed.ignored_entries,
                    "permission document contains entries that grant nothing"
                );
            }
            parsed.permission_set
        }
        Err(error) => {
            warn!(
                %organization_id,
                role = role_name,
                %error,
                "permission document is malformed; role grants nothing"
            );
            PermissionSet::new()
        }
    }
}
