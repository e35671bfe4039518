use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use sanatio_application::SaveRoleInput;
use sanatio_core::UserIdentity;
use sanatio_domain::PermissionSet;

use crate::dto::{AssignRoleRequest, RoleResponse, SaveRoleRequest};
use crate::error::ApiResult;
use crate::extractors::CurrentAbility;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    CurrentAbility(context): CurrentAbility,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_service
        .list_roles(&user, context.ability()?)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn save_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    CurrentAbility(context): CurrentAbility,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let permissions = PermissionSet::from_transport(&payload.permissions)?;
    let role = state
        .role_service
        .save_role(
            &user,
            context.ability()?,
            SaveRoleInput {
                name: payload.name,
                permissions,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    CurrentAbility(context): CurrentAbility,
    Path(role_name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .delete_role(&user, context.ability()?, &role_name)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    CurrentAbility(context): CurrentAbility,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .assign_role(
            &user,
            context.ability()?,
            &payload.subject,
            &payload.role_name,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
