use std::sync::Arc;

use sanatio_core::{AppResult, UserIdentity};
use sanatio_domain::{PathDecision, ProtectedArea};
use tracing::{debug, info};

use crate::{AbilityContext, AbilityService};

/// Outcome of guarding one navigation request.
#[derive(Debug, Clone)]
pub enum GuardOutcome {
    /// The path lies outside the protected area.
    PassThrough,
    /// No session exists; the caller must sign in first.
    RedirectToSignIn {
        /// Sign-in location.
        location: String,
    },
    /// Navigation is allowed; the context carries the caller's ability.
    Allow(AbilityContext),
    /// Navigation is refused because the caller cannot read `subject`.
    Deny {
        /// First path subject without a `read` grant.
        subject: String,
    },
}

/// Boundary enforcer for page navigation under a protected root.
///
/// Only navigation is gated here. Use-cases that change state check the
/// caller's ability themselves.
#[derive(Clone)]
pub struct RouteGuardService {
    ability_service: AbilityService,
    area: Arc<ProtectedArea>,
    sign_in_path: String,
}

impl RouteGuardService {
    /// Creates a route guard for the given protected area.
    #[must_use]
    pub fn new(
        ability_service: AbilityService,
        area: ProtectedArea,
        sign_in_path: impl Into<String>,
    ) -> Self {
        Self {
            ability_service,
            area: Arc::new(area),
            sign_in_path: sign_in_path.into(),
        }
    }

    /// Returns the protected area.
    #[must_use]
    pub fn area(&self) -> &ProtectedArea {
        &self.area
    }

    /// Returns the sign-in location used for unauthenticated callers.
    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        self.sign_in_path.as_str()
    }

    /// Decides how a request for `path` proceeds.
    ///
    /// Checks run in order: protection, session, permission resolution,
    /// then `read` on every path subject with the first failure denying.
    pub async fn check(
        &self,
        identity: Option<&UserIdentity>,
        path: &str,
    ) -> AppResult<GuardOutcome> {
        if !self.area.contains(path) {
            return Ok(GuardOutcome::PassThrough);
        }

        let Some(identity) = identity else {
            debug!(path, "unauthenticated request to protected area");
            return Ok(GuardOutcome::RedirectToSignIn {
                location: self.sign_in_path.clone(),
            });
        };

        let ability = self.ability_service.resolve_for(identity).await?;

        match self.area.authorize(&ability, path) {
            PathDecision::Unprotected => Ok(GuardOutcome::PassThrough),
            PathDecision::Allow => {
                debug!(
                    organization_id = %identity.organization_id(),
                    subject = identity.subject(),
                    path,
                    "navigation allowed"
                );
                Ok(GuardOutcome::Allow(AbilityContext::initialized(ability)))
            }
            PathDecision::Deny { subject } => {
                info!(
                    organization_id = %identity.organization_id(),
                    user = identity.subject(),
                    path,
                    denied_subject = subject.as_str(),
                    "navigation denied"
                );
                Ok(GuardOutcome::Deny { subject })
            }
        }
    }
}
