use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;

use super::StatusResponse;
use crate::auth::Caller;
use crate::error::{AppError, AppResult};
use crate::packages::Package;
use crate::registry::ingest;
use crate::state::AppState;

/// Ingests a batch of packages in order. Every package is checked before any
/// is written; each then commits on its own, so a failure part-way leaves the
/// earlier packages stored.
pub async fn add_information(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Json(packages), _): WithRejection<Json<Vec<Package>>, AppError>,
) -> AppResult<Json<StatusResponse>> {
    packages.iter().try_for_each(Package::validate)?;

    let mut conn = state.db()?;
    for package in &packages {
        let summary = ingest::ingest_package(&mut conn, package, caller.user_id)?;
        tracing::info!(
            package_id = package.id,
            creator_id = caller.user_id,
            organizations = summary.organizations,
            users = summary.users,
            documents = summary.documents,
            "package ingested"
        );
    }

    Ok(Json(StatusResponse::new("ok")))
}
