use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use sanatio_application::{AbilityContext, GuardOutcome};
use sanatio_core::{AppError, AppResult, UserIdentity};
use tower_sessions::Session;
use tracing::error;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::handlers::pages::{error_page, no_permission_page};
use crate::state::AppState;

/// Requires a session identity and attaches it with the caller's ability.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session_identity(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let ability = state.ability_service.resolve_for(&identity).await?;

    request.extensions_mut().insert(identity);
    request
        .extensions_mut()
        .insert(AbilityContext::initialized(ability));
    Ok(next.run(request).await)
}

/// Guards page navigation under the protected root.
///
/// Missing sessions are redirected to sign-in and refused navigation is
/// answered with the static no-permission page. Session or storage
/// failures are logged and answered with the static error page. Paths
/// outside the root pass through untouched.
pub async fn route_guard(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if !state.route_guard_service.area().contains(&path) {
        return next.run(request).await;
    }

    let identity = match session_identity(&session).await {
        Ok(identity) => identity,
        Err(error) => {
            error!(path = path.as_str(), %error, "route guard could not read the session");
            return error_page();
        }
    };

    let outcome = match state
        .route_guard_service
        .check(identity.as_ref(), &path)
        .await
    {
        Ok(outcome) => outcome,
        Err(error) => {
            error!(path = path.as_str(), %error, "route guard could not resolve permissions");
            return error_page();
        }
    };

    match outcome {
        GuardOutcome::PassThrough => next.run(request).await,
        GuardOutcome::RedirectToSignIn { location } => Redirect::to(&location).into_response(),
        GuardOutcome::Deny { .. } => no_permission_page(),
        GuardOutcome::Allow(context) => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            request.extensions_mut().insert(context);
            next.run(request).await
        }
    }
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url.as_str();
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

async fn session_identity(session: &Session) -> AppResult<Option<UserIdentity>> {
    session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
