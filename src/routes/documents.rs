use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::StatusResponse;
use crate::auth::Caller;
use crate::error::{AppError, AppResult};
use crate::registry::documents::{self, DocumentUpdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    pub document_id: i32,
}

pub async fn delete_user_document(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Query(query), _): WithRejection<Query<DocumentQuery>, AppError>,
) -> AppResult<Json<StatusResponse>> {
    let mut conn = state.db()?;
    documents::soft_delete_document(
        &mut conn,
        query.document_id,
        caller.owner_scope(),
        caller.user_id,
    )?;
    Ok(Json(StatusResponse::new("document deleted")))
}

pub async fn update_document(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Json(update), _): WithRejection<Json<DocumentUpdate>, AppError>,
) -> AppResult<Json<StatusResponse>> {
    let mut conn = state.db()?;
    documents::update_document(&mut conn, &update, caller.owner_scope(), caller.user_id)?;
    Ok(Json(StatusResponse::new("document updated")))
}
