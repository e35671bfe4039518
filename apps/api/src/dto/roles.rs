use std::collections::BTreeMap;

use sanatio_application::RoleDefinition;
use sanatio_domain::PermissionSet;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for creating or replacing a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-role-request.ts"
)]
pub struct SaveRoleRequest {
    pub name: String,
    /// Actions keyed by subject, e.g. `{ "patient": ["read", "update"] }`.
    pub permissions: BTreeMap<String, Vec<String>>,
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub subject: String,
    pub role_name: String,
}

/// API representation of an organization role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub name: String,
    pub permissions: BTreeMap<String, Vec<String>>,
}

impl From<RoleDefinition> for RoleResponse {
    fn from(role: RoleDefinition) -> Self {
        Self {
            name: role.name,
            permissions: permission_map(&role.permissions),
        }
    }
}

fn permission_map(permission_set: &PermissionSet) -> BTreeMap<String, Vec<String>> {
    permission_set
        .iter()
        .map(|(subject, actions)| {
            (
                subject.as_str().to_owned(),
                actions
                    .iter()
                    .map(|action| action.as_str().to_owned())
                    .collect(),
            )
        })
        .collect()
}
