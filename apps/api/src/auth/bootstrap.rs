use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sanatio_core::{AppError, OrganizationId, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::BootstrapRequest;
use crate::error::ApiResult;
use crate::state::AppState;

use super::session::start_session;

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let subject = payload.subject.trim().to_owned();
    if subject.is_empty() {
        return Err(AppError::Validation("subject must not be empty".to_owned()).into());
    }
    let display_name = payload
        .display_name
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| subject.clone());
    let requested_organization_id = payload
        .organization_id
        .as_deref()
        .map(str::parse::<OrganizationId>)
        .transpose()?;

    let organization_id = state
        .membership_service
        .sign_in_organization(&subject, &display_name, requested_organization_id)
        .await?;

    let identity = UserIdentity::new(subject, display_name, None, organization_id);
    start_session(&session, &identity).await?;

    info!(
        %organization_id,
        subject = identity.subject(),
        "bootstrap sign-in"
    );

    Ok(StatusCode::NO_CONTENT)
}
