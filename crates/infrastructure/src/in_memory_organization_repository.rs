use std::collections::HashMap;

use async_trait::async_trait;
use sanatio_application::{
    MemberRole, MembershipRepository, OrganizationRepository, RoleRepository, StoredRole,
};
use sanatio_core::{AppError, AppResult, OrganizationId};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MemberRecord {
    organization_id: OrganizationId,
    subject: String,
    display_name: String,
    is_owner: bool,
    role_name: Option<String>,
}

/// In-memory organization, role and membership repository.
///
/// Members are kept in join order so the first organization a subject
/// joined is its default. When both are needed, the roles lock is taken
/// before the members lock.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationRepository {
    organizations: RwLock<HashMap<OrganizationId, String>>,
    roles: RwLock<HashMap<(OrganizationId, String), StoredRole>>,
    members: RwLock<Vec<MemberRecord>>,
}

impl InMemoryOrganizationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn role_key(organization_id: OrganizationId, role_name: &str) -> (OrganizationId, String) {
    (organization_id, role_name.to_lowercase())
}

#[async_trait]
impl MembershipRepository for InMemoryOrganizationRepository {
    async fn find_member_role(
        &self,
        organization_id: OrganizationId,
        subject: &str,
    ) -> AppResult<Option<MemberRole>> {
        let roles = self.roles.read().await;
        let members = self.members.read().await;
        let Some(member) = members
            .iter()
            .find(|member| member.organization_id == organization_id && member.subject == subject)
        else {
            return Ok(None);
        };

        if member.is_owner {
            return Ok(Some(MemberRole::Owner));
        }

        let Some(role_name) = member.role_name.as_deref() else {
            return Ok(Some(MemberRole::Unassigned));
        };

        let stored = roles.get(&role_key(organization_id, role_name));

        Ok(Some(MemberRole::Assigned {
            role_name: stored.map_or_else(|| role_name.to_owned(), |role| role.name.clone()),
            permissions_document: stored.and_then(|role| role.permissions_document.clone()),
        }))
    }

    async fn find_default_organization(&self, subject: &str) -> AppResult<Option<OrganizationId>> {
        Ok(self
            .members
            .read()
            .await
            .iter()
            .find(|member| member.subject == subject)
            .map(|member| member.organization_id))
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn ensure_membership_for_subject(
        &self,
        subject: &str,
        display_name: &str,
        preferred_organization_id: Option<OrganizationId>,
    ) -> AppResult<OrganizationId> {
        let mut members = self.members.write().await;
        if let Some(member) = members.iter().find(|member| member.subject == subject) {
            return Ok(member.organization_id);
        }

        let organization_id = preferred_organization_id.unwrap_or_default();
        self.organizations
            .write()
            .await
            .entry(organization_id)
            .or_insert_with(|| format!("{display_name}'s organization"));

        members.push(MemberRecord {
            organization_id,
            subject: subject.to_owned(),
            display_name: display_name.to_owned(),
            is_owner: true,
            role_name: None,
        });

        Ok(organization_id)
    }

    async fn add_member(
        &self,
        organization_id: OrganizationId,
        subject: &str,
        display_name: &str,
        role_name: Option<&str>,
    ) -> AppResult<()> {
        if !self.organizations.read().await.contains_key(&organization_id) {
            return Err(AppError::NotFound(format!(
                "organization '{organization_id}' not found"
            )));
        }

        let mut members = self.members.write().await;
        let exists = members
            .iter()
            .any(|member| member.organization_id == organization_id && member.subject == subject);
        if !exists {
            members.push(MemberRecord {
                organization_id,
                subject: subject.to_owned(),
                display_name: display_name.to_owned(),
                is_owner: false,
                role_name: role_name.map(str::to_owned),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryOrganizationRepository {
    async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<StoredRole>> {
        let roles = self.roles.read().await;

        let mut values: Vec<(String, StoredRole)> = roles
            .iter()
            .filter(|((stored_organization_id, _), _)| *stored_organization_id == organization_id)
            .map(|((_, key), role)| (key.clone(), role.clone()))
            .collect();
        values.sort_by(|left, right| left.0.cmp(&right.0));

        Ok(values.into_iter().map(|(_, role)| role).collect())
    }

    async fn find_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
    ) -> AppResult<Option<StoredRole>> {
        Ok(self
            .roles
            .read()
            .await
            .get(&role_key(organization_id, role_name))
            .cloned())
    }

    async fn save_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
        permissions_document: &str,
    ) -> AppResult<()> {
        self.roles.write().await.insert(
            role_key(organization_id, role_name),
            StoredRole {
                name: role_name.to_owned(),
                permissions_document: Some(permissions_document.to_owned()),
            },
        );

        Ok(())
    }

    async fn delete_role(&self, organization_id: OrganizationId, role_name: &str) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        let members = self.members.read().await;

        let key = role_key(organization_id, role_name);
        let Some(stored) = roles.get(&key) else {
            return Err(AppError::NotFound(format!("role '{role_name}' not found")));
        };

        let holders = members
            .iter()
            .filter(|member| {
                member.organization_id == organization_id
                    && member
                        .role_name
                        .as_deref()
                        .is_some_and(|assigned| assigned.to_lowercase() == key.1)
            })
            .count();
        if holders > 0 {
            return Err(AppError::Conflict(format!(
                "role '{}' is still assigned to {holders} member(s)",
                stored.name
            )));
        }

        roles.remove(&key);
        Ok(())
    }

    async fn assign_member_role(
        &self,
        organization_id: OrganizationId,
        member_subject: &str,
        role_name: &str,
    ) -> AppResult<()> {
        let roles = self.roles.read().await;
        let mut members = self.members.write().await;

        let role = roles
            .get(&role_key(organization_id, role_name))
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' not found")))?;

        let member = members
            .iter_mut()
            .find(|member| {
                member.organization_id == organization_id
                    && member.subject == member_subject
                    && !member.is_owner
            })
            .ok_or_else(|| {
                AppError::NotFound(format!("assignable member '{member_subject}' not found"))
            })?;

        member.role_name = Some(role.name.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests;
