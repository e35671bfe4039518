use sanatio_application::{
    MemberRole, MembershipRepository, OrganizationRepository, RoleRepository,
};
use sanatio_core::{AppError, OrganizationId};

use super::InMemoryOrganizationRepository;

async fn hospital(repository: &InMemoryOrganizationRepository) -> OrganizationId {
    match repository
        .ensure_membership_for_subject("admin", "Admin", None)
        .await
    {
        Ok(organization_id) => organization_id,
        Err(error) => panic!("organization should be provisioned: {error}"),
    }
}

#[tokio::test]
async fn ensure_membership_is_idempotent() {
    let repository = InMemoryOrganizationRepository::new();
    let preferred = OrganizationId::new();

    let first = repository
        .ensure_membership_for_subject("admin", "Admin", Some(preferred))
        .await;
    let second = repository
        .ensure_membership_for_subject("admin", "Admin", None)
        .await;

    assert!(matches!(first, Ok(organization_id) if organization_id == preferred));
    assert!(matches!(second, Ok(organization_id) if organization_id == preferred));
    assert!(matches!(
        repository.find_member_role(preferred, "admin").await,
        Ok(Some(MemberRole::Owner))
    ));
}

#[tokio::test]
async fn member_roles_resolve_through_stored_documents() {
    let repository = InMemoryOrganizationRepository::new();
    let organization_id = hospital(&repository).await;

    assert!(
        repository
            .save_role(organization_id, "Nurse", r#"{"patient":["read"]}"#)
            .await
            .is_ok()
    );
    assert!(
        repository
            .add_member(organization_id, "nina", "Nina", Some("NURSE"))
            .await
            .is_ok()
    );
    assert!(
        repository
            .add_member(organization_id, "tom", "Tom", None)
            .await
            .is_ok()
    );

    let nurse = repository.find_member_role(organization_id, "nina").await;
    assert!(matches!(
        nurse,
        Ok(Some(MemberRole::Assigned { role_name, permissions_document }))
            if role_name == "Nurse" && permissions_document.as_deref() == Some(r#"{"patient":["read"]}"#)
    ));
    assert!(matches!(
        repository.find_member_role(organization_id, "tom").await,
        Ok(Some(MemberRole::Unassigned))
    ));
    assert!(matches!(
        repository.find_member_role(organization_id, "eve").await,
        Ok(None)
    ));
}

#[tokio::test]
async fn add_member_requires_existing_organization() {
    let repository = InMemoryOrganizationRepository::new();
    let result = repository
        .add_member(OrganizationId::new(), "nina", "Nina", None)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn roles_are_case_insensitive_and_sorted() {
    let repository = InMemoryOrganizationRepository::new();
    let organization_id = hospital(&repository).await;

    for (name, document) in [("Radiologist", "{}"), ("billing clerk", "{}"), ("RADIOLOGIST", "null")] {
        assert!(repository.save_role(organization_id, name, document).await.is_ok());
    }

    let Ok(roles) = repository.list_roles(organization_id).await else {
        panic!("roles should list");
    };
    let names: Vec<&str> = roles.iter().map(|role| role.name.as_str()).collect();
    assert_eq!(names, vec!["billing clerk", "RADIOLOGIST"]);
    assert!(matches!(
        repository.find_role(organization_id, "radiologist").await,
        Ok(Some(role)) if role.permissions_document.as_deref() == Some("null")
    ));
}

#[tokio::test]
async fn assignment_stores_canonical_name_and_skips_owner() {
    let repository = InMemoryOrganizationRepository::new();
    let organization_id = hospital(&repository).await;

    assert!(repository.save_role(organization_id, "Clerk", "{}").await.is_ok());
    assert!(
        repository
            .add_member(organization_id, "carl", "Carl", None)
            .await
            .is_ok()
    );

    assert!(
        repository
            .assign_member_role(organization_id, "carl", "CLERK")
            .await
            .is_ok()
    );
    assert!(matches!(
        repository.find_member_role(organization_id, "carl").await,
        Ok(Some(MemberRole::Assigned { role_name, .. })) if role_name == "Clerk"
    ));
    assert!(matches!(
        repository
            .assign_member_role(organization_id, "admin", "Clerk")
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn deleting_missing_role_is_not_found() {
    let repository = InMemoryOrganizationRepository::new();
    let organization_id = hospital(&repository).await;

    assert!(matches!(
        repository.delete_role(organization_id, "ghost").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn assigning_missing_role_is_not_found() {
    let repository = InMemoryOrganizationRepository::new();
    let organization_id = hospital(&repository).await;

    assert!(
        repository
            .add_member(organization_id, "ivy", "Ivy", None)
            .await
            .is_ok()
    );
    assert!(matches!(
        repository
            .assign_member_role(organization_id, "ivy", "Surgeon")
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        repository.find_member_role(organization_id, "ivy").await,
        Ok(Some(MemberRole::Unassigned))
    ));
}

#[tokio::test]
async fn held_role_delete_is_a_conflict() {
    let repository = InMemoryOrganizationRepository::new();
    let organization_id = hospital(&repository).await;

    assert!(repository.save_role(organization_id, "Porter", "{}").await.is_ok());
    assert!(
        repository
            .add_member(organization_id, "pat", "Pat", Some("porter"))
            .await
            .is_ok()
    );

    assert!(matches!(
        repository.delete_role(organization_id, "PORTER").await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        repository.find_role(organization_id, "Porter").await,
        Ok(Some(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_delete_and_assign_never_leave_dangling_role() {
    let repository = std::sync::Arc::new(InMemoryOrganizationRepository::new());
    let organization_id = hospital(&repository).await;

    for round in 0..64 {
        let role_name = format!("Temp{round}");
        let member = format!("temp-{round}");

        assert!(repository.save_role(organization_id, &role_name, "{}").await.is_ok());
        assert!(
            repository
                .add_member(organization_id, &member, "Temp", None)
                .await
                .is_ok()
        );

        let deleter = {
            let repository = repository.clone();
            let role_name = role_name.clone();
            tokio::spawn(async move { repository.delete_role(organization_id, &role_name).await })
        };
        let assigner = {
            let repository = repository.clone();
            let role_name = role_name.clone();
            let member = member.clone();
            tokio::spawn(async move {
                repository
                    .assign_member_role(organization_id, &member, &role_name)
                    .await
            })
        };

        let deleted = deleter
            .await
            .unwrap_or_else(|error| panic!("delete task should finish: {error}"));
        let assigned = assigner
            .await
            .unwrap_or_else(|error| panic!("assign task should finish: {error}"));

        let role = repository
            .find_role(organization_id, &role_name)
            .await
            .unwrap_or_else(|error| panic!("role lookup should succeed: {error}"));
        let held = repository
            .find_member_role(organization_id, &member)
            .await
            .unwrap_or_else(|error| panic!("member lookup should succeed: {error}"));

        match (deleted, assigned) {
            (Ok(()), Err(AppError::NotFound(_))) => {
                assert!(role.is_none());
                assert!(matches!(held, Some(MemberRole::Unassigned)));
            }
            (Err(AppError::Conflict(_)), Ok(())) => {
                assert!(role.is_some());
                assert!(matches!(
                    held,
                    Some(MemberRole::Assigned { role_name: held_name, .. }) if held_name == role_name
                ));
            }
            (deleted, assigned) => {
                panic!("unexpected interleaving: delete={deleted:?} assign={assigned:?}")
            }
        }
    }
}
