use std::sync::Arc;

use sanatio_application::{
    AbilityService, MembershipService, OrganizationRepository, RoleService, RouteGuardService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub ability_service: AbilityService,
    pub membership_service: MembershipService,
    pub role_service: RoleService,
    pub route_guard_service: RouteGuardService,
    pub organization_repository: Arc<dyn OrganizationRepository>,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
