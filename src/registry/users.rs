use std::collections::HashMap;

use chrono::Utc;
use diesel::{pg::PgConnection, prelude::*};
use serde::{Deserialize, Serialize};

use super::DocumentView;
use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::models::{Document, User, UserChangeset, ACTIVE, DELETED};
use crate::schema::{documents, users};
use crate::validation::{check_gender, not_empty, ValidationResult};

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub type_id: Option<i32>,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "patrName")]
    pub patr_name: Option<String>,
    pub gender_id: Option<i32>,
    pub documents: Vec<DocumentView>,
}

/// Partial update of a user's own fields. Absent or empty values leave the
/// stored column unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "patrName", default)]
    pub patr_name: Option<String>,
    #[serde(default)]
    pub sex: Option<i32>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn validate(&self) -> ValidationResult {
        not_empty("lastName", self.last_name.as_deref())?;
        not_empty("firstName", self.first_name.as_deref())?;
        not_empty("patrName", self.patr_name.as_deref())?;
        not_empty("login", self.login.as_deref())?;
        not_empty("password", self.password.as_deref())?;
        check_gender(self.sex)
    }
}

fn supplied(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

pub fn load_profile(conn: &mut PgConnection, user_id: i32) -> AppResult<UserProfile> {
    let user: User = users::table
        .filter(users::id.eq(user_id))
        .filter(users::deleted.eq(ACTIVE))
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or(AppError::NotFound("user"))?;

    with_documents(conn, vec![user])?
        .pop()
        .ok_or(AppError::NotFound("user"))
}

/// One page of active users, ordered by id. `page` starts at 1.
pub fn list_profiles(
    conn: &mut PgConnection,
    page: i64,
    page_size: i64,
) -> AppResult<Vec<UserProfile>> {
    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| AppError::validation("page is out of range"))?;
    let page_users: Vec<User> = users::table
        .filter(users::deleted.eq(ACTIVE))
        .order(users::id.asc())
        .limit(page_size)
        .offset(offset)
        .select(User::as_select())
        .load(conn)?;

    with_documents(conn, page_users)
}

fn with_documents(conn: &mut PgConnection, owners: Vec<User>) -> AppResult<Vec<UserProfile>> {
    let owner_ids: Vec<i32> = owners.iter().map(|user| user.id).collect();
    let active_documents: Vec<Document> = documents::table
        .filter(documents::user_id.eq_any(&owner_ids))
        .filter(documents::deleted.eq(ACTIVE))
        .order(documents::id.asc())
        .select(Document::as_select())
        .load(conn)?;

    let mut by_owner: HashMap<i32, Vec<DocumentView>> = HashMap::new();
    for document in active_documents {
        if let Some(owner_id) = document.user_id {
            by_owner
                .entry(owner_id)
                .or_default()
                .push(DocumentView::try_from(document)?);
        }
    }

    Ok(owners
        .into_iter()
        .map(|user| UserProfile {
            documents: by_owner.remove(&user.id).unwrap_or_default(),
            id: user.id,
            type_id: user.type_id,
            last_name: user.last_name,
            first_name: user.first_name,
            patr_name: user.patr_name,
            gender_id: user.gender_id,
        })
        .collect())
}

/// Marks the user and all of their active documents deleted in one transaction.
pub fn soft_delete_user(conn: &mut PgConnection, user_id: i32, modifier_id: i32) -> AppResult<()> {
    conn.transaction::<_, AppError, _>(|conn| {
        let now = Utc::now().naive_utc();
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::deleted.eq(ACTIVE)),
        )
        .set((
            users::deleted.eq(DELETED),
            users::modify_datetime.eq(now),
            users::modify_user_id.eq(modifier_id),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(AppError::NotFound("user"));
        }

        let documents_deleted = diesel::update(
            documents::table
                .filter(documents::user_id.eq(user_id))
                .filter(documents::deleted.eq(ACTIVE)),
        )
        .set((
            documents::deleted.eq(DELETED),
            documents::modify_datetime.eq(now),
            documents::modify_user_id.eq(modifier_id),
        ))
        .execute(conn)?;

        tracing::info!(user_id, modifier_id, documents_deleted, "user soft-deleted");
        Ok(())
    })
}

pub fn update_user(
    conn: &mut PgConnection,
    user_id: i32,
    modifier_id: i32,
    update: &UserUpdate,
) -> AppResult<()> {
    update.validate()?;

    let password = match supplied(&update.password) {
        Some(plain) => Some(password::hash_password(&plain)?),
        None => None,
    };
    let changes = UserChangeset {
        last_name: supplied(&update.last_name),
        first_name: supplied(&update.first_name),
        patr_name: supplied(&update.patr_name),
        gender_id: update.sex.filter(|sex| *sex != 0),
        login: supplied(&update.login),
        password,
        modify_datetime: Utc::now().naive_utc(),
        modify_user_id: modifier_id,
    };

    let updated = diesel::update(
        users::table
            .filter(users::id.eq(user_id))
            .filter(users::deleted.eq(ACTIVE)),
    )
    .set(&changes)
    .execute(conn)?;

    if updated == 0 {
        return Err(AppError::NotFound("user"));
    }

    tracing::info!(user_id, modifier_id, "user updated");
    Ok(())
}
