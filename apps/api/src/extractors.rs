use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sanatio_application::AbilityContext;
use sanatio_core::AppError;
use tracing::error;

use crate::error::ApiError;

/// The request's ability context, attached by the auth or route guard middleware.
///
/// Handlers reached without either middleware fail with
/// [`AppError::ContextNotInitialized`] instead of running unauthorized.
pub struct CurrentAbility(pub AbilityContext);

impl<S> FromRequestParts<S> for CurrentAbility
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(context) = parts.extensions.get::<AbilityContext>() else {
            error!(path = parts.uri.path(), "handler reached without an ability context");
            return Err(AppError::ContextNotInitialized(format!(
                "no ability context attached to '{}'",
                parts.uri.path()
            ))
            .into());
        };

        Ok(Self(context.clone()))
    }
}
