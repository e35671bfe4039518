use std::sync::Arc;

use sanatio_application::{
    AbilityService, MembershipRepository, MembershipService, OrganizationRepository,
    RoleRepository, RoleService, RouteGuardService,
};
use sanatio_core::AppError;
use sanatio_domain::SubjectCatalog;
use sanatio_infrastructure::{
    InMemoryOrganizationRepository, PostgresMembershipRepository, PostgresRoleRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_postgres_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let membership_repository = Arc::new(PostgresMembershipRepository::new(pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pool));

    build_app_state(
        membership_repository.clone(),
        membership_repository,
        role_repository,
        config,
    )
}

pub fn build_in_memory_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let repository = Arc::new(InMemoryOrganizationRepository::new());

    build_app_state(repository.clone(), repository.clone(), repository, config)
}

fn build_app_state(
    membership_repository: Arc<dyn MembershipRepository>,
    organization_repository: Arc<dyn OrganizationRepository>,
    role_repository: Arc<dyn RoleRepository>,
    config: &ApiConfig,
) -> Result<AppState, AppError> {
    let catalog = Arc::new(SubjectCatalog::hospital_default());
    let protected_area = config.route_guard.protected_area(&catalog)?;

    let ability_service = AbilityService::new(membership_repository.clone(), catalog.clone());
    let route_guard_service = RouteGuardService::new(
        ability_service.clone(),
        protected_area,
        config.route_guard.sign_in_path.clone(),
    );

    Ok(AppState {
        ability_service,
        membership_service: MembershipService::new(
            membership_repository.clone(),
            organization_repository.clone(),
        ),
        role_service: RoleService::new(role_repository, membership_repository, catalog),
        route_guard_service,
        organization_repository,
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    })
}
