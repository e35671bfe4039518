use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use sanatio_core::{AppError, AppResult, OrganizationId, UserIdentity};
use sanatio_domain::{Ability, Action, PermissionSet, SubjectCatalog};
use serde_json::json;
use tokio::sync::Mutex;

use crate::{
    MemberRole, MembershipRepository, RoleRepository, SaveRoleInput, StoredRole,
};

use super::RoleService;

#[derive(Clone)]
enum FakeMember {
    Owner,
    Unassigned,
    Role(String),
}

#[derive(Default)]
struct FakeStore {
    roles: Mutex<BTreeMap<(OrganizationId, String), StoredRole>>,
    members: Mutex<HashMap<(OrganizationId, String), FakeMember>>,
}

impl FakeStore {
    async fn add_member(&self, organization_id: OrganizationId, subject: &str, member: FakeMember) {
        self.members
            .lock()
            .await
            .insert((organization_id, subject.to_owned()), member);
    }

    async fn add_role(&self, organization_id: OrganizationId, name: &str, document: &str) {
        self.roles.lock().await.insert(
            (organization_id, name.to_lowercase()),
            StoredRole {
                name: name.to_owned(),
                permissions_document: Some(document.to_owned()),
            },
        );
    }
}

#[async_trait]
impl MembershipRepository for FakeStore {
    async fn find_member_role(
        &self,
        organization_id: OrganizationId,
        subject: &str,
    ) -> AppResult<Option<MemberRole>> {
        let members = self.members.lock().await;
        let role_name = match members.get(&(organization_id, subject.to_owned())) {
            None => return Ok(None),
            Some(FakeMember::Owner) => return Ok(Some(MemberRole::Owner)),
            Some(FakeMember::Unassigned) => return Ok(Some(MemberRole::Unassigned)),
            Some(FakeMember::Role(role_name)) => role_name,
        };

        let document = self
            .roles
            .lock()
            .await
            .get(&(organization_id, role_name.to_lowercase()))
            .and_then(|role| role.permissions_document.clone());

        Ok(Some(MemberRole::Assigned {
            role_name: role_name.clone(),
            permissions_document: document,
        }))
    }

    async fn find_default_organization(&self, subject: &str) -> AppResult<Option<OrganizationId>> {
        Ok(self
            .members
            .lock()
            .await
            .keys()
            .find(|(_, member)| member == subject)
            .map(|(organization_id, _)| *organization_id))
    }
}

#[async_trait]
impl RoleRepository for FakeStore {
    async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<StoredRole>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|((owner, _), _)| *owner == organization_id)
            .map(|(_, role)| role.clone())
            .collect())
    }

    async fn find_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
    ) -> AppResult<Option<StoredRole>> {
        Ok(self
            .roles
            .lock()
            .await
            .get(&(organization_id, role_name.to_lowercase()))
            .cloned())
    }

    async fn save_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
        permissions_document: &str,
    ) -> AppResult<()> {
        self.add_role(organization_id, role_name, permissions_document)
            .await;
        Ok(())
    }

    async fn delete_role(
        &self,
        organization_id: OrganizationId,
        role_name: &str,
    ) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let members = self.members.lock().await;
        let key = (organization_id, role_name.to_lowercase());
        if !roles.contains_key(&key) {
            return Err(AppError::NotFound(format!("role '{role_name}' not found")));
        }

        let in_use = members.iter().any(|((owner, _), member)| {
            *owner == organization_id
                && matches!(member, FakeMember::Role(role) if role.eq_ignore_ascii_case(role_name))
        });
        if in_use {
            return Err(AppError::Conflict(format!("role '{role_name}' is in use")));
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
        let roles = self.roles.lock().await;
        let Some(role) = roles.get(&(organization_id, role_name.to_lowercase())) else {
            return Err(AppError::NotFound(format!("role '{role_name}' not found")));
        };

        let mut members = self.members.lock().await;
        match members.get_mut(&(organization_id, member_subject.to_owned())) {
            Some(member) if !matches!(member, FakeMember::Owner) => {
                *member = FakeMember::Role(role.name.clone());
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "assignable member '{member_subject}' not found"
            ))),
        }
    }
}

struct Fixture {
    store: Arc<FakeStore>,
    service: RoleService,
    organization_id: OrganizationId,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(FakeStore::default());
        let service = RoleService::new(
            store.clone(),
            store.clone(),
            Arc::new(SubjectCatalog::hospital_default()),
        );

        Self {
            store,
            service,
            organization_id: OrganizationId::new(),
        }
    }

    fn actor(&self) -> UserIdentity {
        UserIdentity::new("admin", "Admin", None, self.organization_id)
    }
}

fn ability(grants: serde_json::Value) -> Ability {
    let Ok(parsed) = PermissionSet::parse_document(&grants.to_string()) else {
        panic!("grants should parse: {grants}");
    };
    Ability::compile(Some(&parsed.permission_set))
}

fn nurse_permissions() -> PermissionSet {
    match PermissionSet::from_grants([
        ("patient", vec![Action::Read, Action::Update]),
        ("bed", vec![Action::Read]),
    ]) {
        Ok(permissions) => permissions,
        Err(error) => panic!("grants should build: {error}"),
    }
}

#[tokio::test]
async fn save_role_creates_role_with_create_grant() {
    let fixture = Fixture::new();
    let result = fixture
        .service
        .save_role(
            &fixture.actor(),
            &ability(json!({ "role": ["create"] })),
            SaveRoleInput {
                name: " Nurse ".to_owned(),
                permissions: nurse_permissions(),
            },
        )
        .await;

    assert!(matches!(&result, Ok(role) if role.name == "Nurse"));

    let stored = fixture
        .store
        .find_role(fixture.organization_id, "nurse")
        .await;
    let Ok(Some(stored)) = stored else {
        panic!("role should be stored");
    };
    let parsed = PermissionSet::parse_document(stored.permissions_document.as_deref().unwrap_or("null"));
    assert!(matches!(parsed, Ok(parsed) if parsed.permission_set == nurse_permissions()));
}

#[tokio::test]
async fn replacing_existing_role_requires_update_grant() {
    let fixture = Fixture::new();
    fixture
        .store
        .add_role(fixture.organization_id, "Nurse", "{}")
        .await;

    let input = SaveRoleInput {
        name: "nurse".to_owned(),
        permissions: nurse_permissions(),
    };
    let denied = fixture
        .service
        .save_role(&fixture.actor(), &ability(json!({ "role": ["create"] })), input.clone())
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let allowed = fixture
        .service
        .save_role(&fixture.actor(), &ability(json!({ "role": ["update"] })), input)
        .await;
    assert!(allowed.is_ok());
}

#[tokio::test]
async fn save_role_rejects_subjects_outside_catalog() {
    let fixture = Fixture::new();
    let permissions = match PermissionSet::from_grants([("morgue", vec![Action::Read])]) {
        Ok(permissions) => permissions,
        Err(error) => panic!("grants should build: {error}"),
    };

    let result = fixture
        .service
        .save_role(
            &fixture.actor(),
            &ability(json!({ "role": ["create"] })),
            SaveRoleInput {
                name: "pathologist".to_owned(),
                permissions,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn owner_role_name_is_reserved() {
    let fixture = Fixture::new();
    let result = fixture
        .service
        .save_role(
            &fixture.actor(),
            &ability(json!({ "role": ["create"] })),
            SaveRoleInput {
                name: "Owner".to_owned(),
                permissions: PermissionSet::new(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn list_roles_requires_read_grant_and_decodes_documents() {
    let fixture = Fixture::new();
    fixture
        .store
        .add_role(fixture.organization_id, "Nurse", r#"{"patient": ["read"]}"#)
        .await;
    fixture
        .store
        .add_role(fixture.organization_id, "Broken", "{oops")
        .await;

    let denied = fixture
        .service
        .list_roles(&fixture.actor(), &Ability::empty())
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let Ok(roles) = fixture
        .service
        .list_roles(&fixture.actor(), &ability(json!({ "role": ["read"] })))
        .await
    else {
        panic!("roles should list");
    };
    assert_eq!(roles.len(), 2);
    let broken = roles.iter().find(|role| role.name == "Broken");
    assert!(broken.is_some_and(|role| role.permissions.is_empty()));
    let nurse = roles.iter().find(|role| role.name == "Nurse");
    assert!(nurse.is_some_and(|role| role.permissions.contains("patient", Action::Read)));
}

#[tokio::test]
async fn delete_role_refuses_roles_in_use() {
    let fixture = Fixture::new();
    fixture
        .store
        .add_role(fixture.organization_id, "Nurse", "{}")
        .await;
    fixture
        .store
        .add_member(fixture.organization_id, "bob", FakeMember::Role("Nurse".to_owned()))
        .await;
    let deleter = ability(json!({ "role": ["delete"] }));

    let result = fixture
        .service
        .delete_role(&fixture.actor(), &deleter, "nurse")
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let missing = fixture
        .service
        .delete_role(&fixture.actor(), &deleter, "surgeon")
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_role_removes_unused_role() {
    let fixture = Fixture::new();
    fixture
        .store
        .add_role(fixture.organization_id, "Porter", "{}")
        .await;

    let result = fixture
        .service
        .delete_role(
            &fixture.actor(),
            &ability(json!({ "role": ["delete"] })),
            "porter",
        )
        .await;
    assert!(result.is_ok());
    assert!(matches!(
        fixture.store.find_role(fixture.organization_id, "porter").await,
        Ok(None)
    ));
}

#[tokio::test]
async fn assign_role_requires_staff_update_grant() {
    let fixture = Fixture::new();
    fixture
        .store
        .add_role(fixture.organization_id, "Nurse", "{}")
        .await;
    fixture
        .store
        .add_member(fixture.organization_id, "bob", FakeMember::Owner)
        .await;
    fixture
        .store
        .add_member(fixture.organization_id, "carol", FakeMember::Role("Nurse".to_owned()))
        .await;

    let denied = fixture
        .service
        .assign_role(&fixture.actor(), &ability(json!({ "role": ["update"] })), "carol", "Nurse")
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let staff_editor = ability(json!({ "staff": ["update"] }));
    let owner_change = fixture
        .service
        .assign_role(&fixture.actor(), &staff_editor, "bob", "Nurse")
        .await;
    assert!(matches!(owner_change, Err(AppError::Conflict(_))));

    let stranger = fixture
        .service
        .assign_role(&fixture.actor(), &staff_editor, "mallory", "Nurse")
        .await;
    assert!(matches!(stranger, Err(AppError::NotFound(_))));

    let unknown_role = fixture
        .service
        .assign_role(&fixture.actor(), &staff_editor, "carol", "Surgeon")
        .await;
    assert!(matches!(unknown_role, Err(AppError::NotFound(_))));

    let assigned = fixture
        .service
        .assign_role(&fixture.actor(), &staff_editor, "carol", "nurse")
        .await;
    assert!(assigned.is_ok());
    assert!(matches!(
        fixture.store.find_member_role(fixture.organization_id, "carol").await,
        Ok(Some(MemberRole::Assigned { role_name, .. })) if role_name == "Nurse"
    ));
}

#[tokio::test]
async fn unassigned_member_receives_role_grants() {
    let fixture = Fixture::new();
    fixture
        .store
        .add_role(fixture.organization_id, "Receptionist", r#"{"appointment": ["create", "read"]}"#)
        .await;
    fixture
        .store
        .add_member(fixture.organization_id, "dave", FakeMember::Unassigned)
        .await;

    let assigned = fixture
        .service
        .assign_role(
            &fixture.actor(),
            &ability(json!({ "staff": ["update"] })),
            "dave",
            "receptionist",
        )
        .await;
    assert!(assigned.is_ok());

    let member_role = fixture
        .store
        .find_member_role(fixture.organization_id, "dave")
        .await;
    let Ok(Some(MemberRole::Assigned {
        role_name,
        permissions_document,
    })) = member_role
    else {
        panic!("member should hold a role");
    };
    assert_eq!(role_name, "Receptionist");
    assert!(permissions_document.is_some());
}
