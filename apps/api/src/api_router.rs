mod cors;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use sanatio_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

use self::cors::build_cors_layer;

pub fn build_router<Store>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/auth/organization",
            post(auth::switch_organization_handler),
        )
        .route(
            "/api/me/abilities",
            get(handlers::access::my_abilities_handler),
        )
        .route("/api/subjects", get(handlers::access::list_subjects_handler))
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler).put(handlers::roles::save_role_handler),
        )
        .route(
            "/api/roles/{role_name}",
            delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/role-assignments",
            post(handlers::roles::assign_role_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let protected_root = app_state.route_guard_service.area().root().to_owned();
    let page_routes = Router::new()
        .route(
            app_state.route_guard_service.sign_in_path(),
            get(handlers::pages::sign_in_page_handler),
        )
        .route(
            &protected_root,
            get(handlers::pages::workspace_page_handler),
        )
        .route(
            &format!("{protected_root}/{{*rest}}"),
            get(handlers::pages::workspace_page_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .merge(page_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(from_fn_with_state(app_state.clone(), middleware::route_guard))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
