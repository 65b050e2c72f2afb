//! Home page: catalog totals and the session visit counter

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppResult, models::summary::HomeSummary};

use super::session_id;

/// Catalog summary counts; counts this visit in the caller's session
#[utoipa::path(
    get,
    path = "/catalog/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog totals and visits before this one", body = HomeSummary)
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<HomeSummary>)> {
    let (jar, session) = session_id(jar, &state.config.session.cookie_name);

    let mut summary = state.services.catalog.home_summary().await?;
    summary.num_visits = state.services.visits.record_visit(&session).await?;

    Ok((jar, Json(summary)))
}
