use axum::extract::{Extension, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use sanatio_core::UserIdentity;
use sanatio_domain::{Action, GateVisibility, gate};

use crate::error::ApiResult;
use crate::extractors::CurrentAbility;
use crate::state::AppState;

const SIGN_IN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<main>
<h1>Sign in</h1>
<p>Your session has ended or you have not signed in yet.</p>
</main>
</body>
</html>
"#;

const NO_PERMISSION_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>No permission</title></head>
<body>
<main>
<h1>You do not have permission to view this page</h1>
<p>Ask your hospital administrator to grant your role access.</p>
</main>
</body>
</html>
"#;

const ERROR_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Something went wrong</title></head>
<body>
<main>
<h1>This page could not be loaded</h1>
<p>Please try again in a moment.</p>
</main>
</body>
</html>
"#;

pub async fn sign_in_page_handler() -> Html<&'static str> {
    Html(SIGN_IN_PAGE)
}

/// Static page served in place of a protected page the caller may not read.
pub fn no_permission_page() -> Response {
    (StatusCode::OK, Html(NO_PERMISSION_PAGE)).into_response()
}

/// Static page served when protected navigation fails internally.
pub fn error_page() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(ERROR_PAGE)).into_response()
}

/// Placeholder workspace page; navigation lists only readable subjects.
pub async fn workspace_page_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    CurrentAbility(context): CurrentAbility,
    uri: Uri,
) -> ApiResult<Html<String>> {
    let ability = context.ability()?;
    let root = escape_html(state.route_guard_service.area().root());

    let navigation = state
        .ability_service
        .catalog()
        .entries()
        .iter()
        .map(|entry| entry.subject().as_str())
        .filter(|subject| gate(ability, Action::Read, subject) == GateVisibility::Visible)
        .map(|subject| {
            let subject = escape_html(subject);
            format!(r#"<li><a href="{root}/{subject}">{subject}</a></li>"#)
        })
        .collect::<String>();

    Ok(Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sanatio</title></head>
<body>
<nav><ul>{navigation}</ul></nav>
<main data-path="{path}">
<h1>{display_name}</h1>
</main>
</body>
</html>
"#,
        path = escape_html(uri.path()),
        display_name = escape_html(user.display_name()),
    )))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
