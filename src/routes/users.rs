use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::StatusResponse;
use crate::auth::{AdminCaller, Caller};
use crate::error::{AppError, AppResult};
use crate::registry::users::{self, UserProfile, UserUpdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UserTargetQuery {
    pub user_id: Option<i32>,
}

pub async fn get_personal_info(
    State(state): State<AppState>,
    caller: Caller,
) -> AppResult<Json<UserProfile>> {
    let mut conn = state.db()?;
    let profile = users::load_profile(&mut conn, caller.user_id)?;
    Ok(Json(profile))
}

pub async fn get_users_data(
    State(state): State<AppState>,
    AdminCaller(_): AdminCaller,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> AppResult<Json<Vec<UserProfile>>> {
    if query.page < 1 {
        return Err(AppError::validation("page must be at least 1"));
    }

    let mut conn = state.db()?;
    let profiles = users::list_profiles(&mut conn, query.page, state.config.page_size)?;
    Ok(Json(profiles))
}

pub async fn delete_user_info(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Query(query), _): WithRejection<Query<UserTargetQuery>, AppError>,
) -> AppResult<Json<StatusResponse>> {
    let target = caller.target_user(query.user_id);
    let mut conn = state.db()?;
    users::soft_delete_user(&mut conn, target, caller.user_id)?;
    Ok(Json(StatusResponse::new("user deleted")))
}

pub async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Query(query), _): WithRejection<Query<UserTargetQuery>, AppError>,
    WithRejection(Json(update), _): WithRejection<Json<UserUpdate>, AppError>,
) -> AppResult<Json<StatusResponse>> {
    let target = caller.target_user(query.user_id);
    let mut conn = state.db()?;
    users::update_user(&mut conn, target, caller.user_id, &update)?;
    Ok(Json(StatusResponse::new("user updated")))
}
