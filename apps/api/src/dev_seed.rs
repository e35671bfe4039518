use std::str::FromStr;

use sanatio_application::SaveRoleInput;
use sanatio_core::{AppError, AppResult, OrganizationId, UserIdentity};
use sanatio_domain::{Ability, Action, PermissionSet};
use tracing::info;

use crate::state::AppState;

const DEV_SEED_ORGANIZATION_ID: &str = "11111111-1111-1111-1111-111111111111";
const DEV_SEED_OWNER_SUBJECT: &str = "admin";
const DEV_SEED_OWNER_DISPLAY_NAME: &str = "Hospital Administrator";

const READ: &[Action] = &[Action::Read];
const READ_UPDATE: &[Action] = &[Action::Read, Action::Update];
const ALL: &[Action] = &[Action::Create, Action::Read, Action::Update, Action::Delete];

type SeedGrants = &'static [(&'static str, &'static [Action])];

const DEV_SEED_ROLES: &[(&str, SeedGrants)] = &[
    (
        "Receptionist",
        &[
            ("patient", &[Action::Create, Action::Read, Action::Update]),
            ("appointment", ALL),
            ("bed", READ),
            ("dashboard", READ),
        ],
    ),
    (
        "Nurse",
        &[
            ("patient", READ_UPDATE),
            ("bed", READ_UPDATE),
            ("ward", READ),
            ("prescription", READ),
            ("dashboard", READ),
        ],
    ),
    (
        "Pharmacist",
        &[
            ("pharmacy", ALL),
            ("inventory", READ_UPDATE),
            ("prescription", READ_UPDATE),
            ("patient", READ),
        ],
    ),
    (
        "Accountant",
        &[
            ("billing", ALL),
            ("settings", READ),
            ("hospitalcharge", READ_UPDATE),
            ("chargetype", READ),
            ("report", READ),
        ],
    ),
];

/// Seeded staff: subject, display name and role. `None` leaves the member unassigned.
const DEV_SEED_MEMBERS: &[(&str, &str, Option<&str>)] = &[
    ("reception", "Front Desk", Some("Receptionist")),
    ("nurse", "Ward Nurse", Some("Nurse")),
    ("pharmacy", "Dispensary", Some("Pharmacist")),
    ("accounts", "Accounts Office", Some("Accountant")),
    ("intern", "New Intern", None),
];

/// Seeds a demo hospital with an owner, four staff roles and their members.
pub async fn run(state: &AppState) -> AppResult<()> {
    let preferred_organization_id = OrganizationId::from_str(DEV_SEED_ORGANIZATION_ID)?;

    let organization_id = state
        .organization_repository
        .ensure_membership_for_subject(
            DEV_SEED_OWNER_SUBJECT,
            DEV_SEED_OWNER_DISPLAY_NAME,
            Some(preferred_organization_id),
        )
        .await?;

    let owner = UserIdentity::new(
        DEV_SEED_OWNER_SUBJECT,
        DEV_SEED_OWNER_DISPLAY_NAME,
        None,
        organization_id,
    );
    let owner_ability = Ability::owner(state.role_service.list_subject_catalog());

    for (role_name, grants) in DEV_SEED_ROLES {
        let permissions = PermissionSet::from_grants(
            grants
                .iter()
                .map(|(subject, actions)| (*subject, actions.to_vec())),
        )
        .map_err(|error| {
            AppError::Internal(format!("invalid dev seed role '{role_name}': {error}"))
        })?;

        state
            .role_service
            .save_role(
                &owner,
                &owner_ability,
                SaveRoleInput {
                    name: (*role_name).to_owned(),
                    permissions,
                },
            )
            .await?;
    }

    for (subject, display_name, role_name) in DEV_SEED_MEMBERS {
        state
            .organization_repository
            .add_member(organization_id, subject, display_name, None)
            .await?;

        if let Some(role_name) = role_name {
            state
                .role_service
                .assign_role(&owner, &owner_ability, subject, role_name)
                .await?;
        }
    }

    info!(
        %organization_id,
        roles = DEV_SEED_ROLES.len(),
        members = DEV_SEED_MEMBERS.len(),
        "dev seed applied"
    );

    Ok(())
}
