use axum::Json;
use axum::extract::{Extension, State};
use sanatio_core::{OrganizationId, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{SwitchOrganizationRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session::start_session;

pub async fn switch_organization_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    session: Session,
    Json(payload): Json<SwitchOrganizationRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let organization_id = payload.organization_id.parse::<OrganizationId>()?;

    state
        .membership_service
        .require_membership(organization_id, identity.subject())
        .await?;

    let switched = identity.with_organization(organization_id);
    start_session(&session, &switched).await?;

    info!(
        from = %identity.organization_id(),
        to = %organization_id,
        subject = switched.subject(),
        "active organization switched"
    );

    Ok(Json(UserIdentityResponse::from(switched)))
}
