use axum::Json;
use axum::extract::State;

use crate::dto::{AbilitiesResponse, SubjectCatalogEntryResponse};
use crate::error::ApiResult;
use crate::extractors::CurrentAbility;
use crate::state::AppState;

pub async fn my_abilities_handler(
    State(state): State<AppState>,
    CurrentAbility(context): CurrentAbility,
) -> ApiResult<Json<AbilitiesResponse>> {
    let ability = context.ability()?;

    Ok(Json(AbilitiesResponse::from_ability(
        ability,
        state.ability_service.catalog(),
    )))
}

pub async fn list_subjects_handler(
    State(state): State<AppState>,
) -> Json<Vec<SubjectCatalogEntryResponse>> {
    Json(
        state
            .role_service
            .list_subject_catalog()
            .entries()
            .iter()
            .map(SubjectCatalogEntryResponse::from)
            .collect(),
    )
}
