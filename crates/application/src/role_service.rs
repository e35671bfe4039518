use std::sync::Arc;

use sanatio_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use sanatio_domain::{Ability, Action, SubjectCatalog};
use tracing::info;

use crate::ability_context::require_ability;
use crate::ability_service::decode_stored_permissions;
use crate::{
    MemberRole, MembershipRepository, RoleDefinition, RoleRepository, SaveRoleInput, StoredRole,
};

const ROLE_SUBJECT: &str = "role";
const STAFF_SUBJECT: &str = "staff";
const OWNER_ROLE_NAME: &str = "owner";
const ROLE_NAME_MAX_LENGTH: usize = 64;

/// Application service for organization role administration.
///
/// Every operation checks the caller's ability itself; the route guard in
/// front of the pages is not relied upon.
#[derive(Clone)]
pub struct RoleService {
    role_repository: Arc<dyn RoleRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    catalog: Arc<SubjectCatalog>,
}

impl RoleService {
    /// Creates a new role service.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        catalog: Arc<SubjectCatalog>,
    ) -> Self {
        Self {
            role_repository,
            membership_repository,
            catalog,
        }
    }

    /// Returns the subject catalog role editors choose grants from.
    #[must_use]
    pub fn list_subject_catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    /// Lists the roles of the actor's organization.
    pub async fn list_roles(
        &self,
        actor: &UserIdentity,
        ability: &Ability,
    ) -> AppResult<Vec<RoleDefinition>> {
        require_ability(ability, Action::Read, ROLE_SUBJECT)?;

        let organization_id = actor.organization_id();
        let roles = self.role_repository.list_roles(organization_id).await?;

        Ok(roles
            .into_iter()
            .map(|role: StoredRole| {
                let permissions = decode_stored_permissions(
                    organization_id,
                    &role.name,
                    role.permissions_document.as_deref(),
                );
                RoleDefinition {
                    name: role.name,
                    permissions,
                }
            })
            .collect())
    }

    /// Creates a role or replaces the grants of an existing one.
    pub async fn save_role(
        &self,
        actor: &UserIdentity,
        ability: &Ability,
        input: SaveRoleInput,
    ) -> AppResult<RoleDefinition> {
        let organization_id = actor.organization_id();
        let name = normalize_role_name(&input.name)?;

        let existing = self
            .role_repository
            .find_role(organization_id, &name)
            .await?;
        let required_action = if existing.is_some() {
            Action::Update
        } else {
            Action::Create
        };
        require_ability(ability, required_action, ROLE_SUBJECT)?;

        input.permissions.validate_against(&self.catalog)?;

        self.role_repository
            .save_role(organization_id, &name, &input.permissions.to_document())
            .await?;

        info!(
            %organization_id,
            actor = actor.subject(),
            role = name.as_str(),
            created = existing.is_none(),
            "role saved"
        );

        Ok(RoleDefinition {
            name,
            permissions: input.permissions,
        })
    }

    /// Deletes a role that no member holds anymore.
    pub async fn delete_role(
        &self,
        actor: &UserIdentity,
        ability: &Ability,
        role_name: &str,
    ) -> AppResult<()> {
        require_ability(ability, Action::Delete, ROLE_SUBJECT)?;

        let organization_id = actor.organization_id();
        let name = normalize_role_name(role_name)?;

        self.role_repository
            .delete_role(organization_id, &name)
            .await?;

        info!(
            %organization_id,
            actor = actor.subject(),
            role = name.as_str(),
            "role deleted"
        );

        Ok(())
    }

    /// Assigns a role to a staff member of the actor's organization.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        ability: &Ability,
        member_subject: &str,
        role_name: &str,
    ) -> AppResult<()> {
        require_ability(ability, Action::Update, STAFF_SUBJECT)?;

        let organization_id = actor.organization_id();
        let name = normalize_role_name(role_name)?;

        match self
            .membership_repository
            .find_member_role(organization_id, member_subject)
            .await?
        {
            None => {
                return Err(AppError::NotFound(format!(
                    "subject '{member_subject}' is not a member of this organization"
                )));
            }
            Some(MemberRole::Owner) => {
                return Err(AppError::Conflict(
                    "the organization owner cannot be assigned a role".to_owned(),
                ));
            }
            Some(MemberRole::Assigned { .. } | MemberRole::Unassigned) => {}
        }

        self.role_repository
            .assign_member_role(organization_id, member_subject, &name)
            .await?;

        info!(
            %organization_id,
            actor = actor.subject(),
            member = member_subject,
            role = name.as_str(),
            "role assigned"
        );

        Ok(())
    }
}

fn normalize_role_name(value: &str) -> AppResult<String> {
    let name = String::from(NonEmptyString::new(value.trim())?);

    if name.eq_ignore_ascii_case(OWNER_ROLE_NAME) {
        return Err(AppError::Validation(
            "'owner' is reserved for the organization owner".to_owned(),
        ));
    }
    if name.chars().count() > ROLE_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "role name must be at most {ROLE_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(name)
}

#[cfg(test)]
mod tests;
