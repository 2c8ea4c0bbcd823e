pub mod password;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use diesel::{pg::PgConnection, prelude::*};
use once_cell::sync::Lazy;

use crate::{
    error::{AppError, AppResult},
    models::{User, ACTIVE},
    schema::users,
    state::AppState,
    types::UserType,
};

pub const LOGIN_HEADER: &str = "login";
pub const PASSWORD_HEADER: &str = "password";

/// Hash checked when there is no stored one, so a missing login costs the
/// same argon2 verification as a wrong password.
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| password::hash_password("registry-dummy-password").ok());

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub user_type: UserType,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::AdminRequired)
        }
    }

    /// Admins may act on any user; everyone else always acts on themselves.
    pub fn target_user(&self, requested: Option<i32>) -> i32 {
        match requested {
            Some(user_id) if self.is_admin() => user_id,
            _ => self.user_id,
        }
    }

    /// Owner filter for document operations, `None` for admins.
    pub fn owner_scope(&self) -> Option<i32> {
        (!self.is_admin()).then_some(self.user_id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let login = credential_header(&parts.headers, LOGIN_HEADER)?;
        let password = credential_header(&parts.headers, PASSWORD_HEADER)?;

        let mut conn = state.db()?;
        authenticate(&mut conn, login, password)
    }
}

/// A caller that has been checked to be an administrator.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        caller.require_admin()?;
        Ok(AdminCaller(caller))
    }
}

fn credential_header<'a>(headers: &'a HeaderMap, name: &str) -> AppResult<&'a str> {
    headers
        .get(name)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .ok_or_else(|| {
            tracing::debug!(header = name, "credential header missing");
            AppError::BadCredentials
        })
}

/// Resolves login and password to an active user. Every failure looks the
/// same to the client so that logins cannot be enumerated.
pub fn authenticate(conn: &mut PgConnection, login: &str, password: &str) -> AppResult<Caller> {
    let user: Option<User> = users::table
        .filter(users::login.eq(login))
        .filter(users::deleted.eq(ACTIVE))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    let Some(user) = user else {
        verify_against_dummy(password);
        tracing::warn!(%login, "login not found");
        return Err(AppError::BadCredentials);
    };

    let Some(password_hash) = user.password.as_deref() else {
        verify_against_dummy(password);
        tracing::warn!(%login, "user has no password set");
        return Err(AppError::BadCredentials);
    };

    match password::verify_password(password, password_hash) {
        Ok(true) => Ok(Caller {
            user_id: user.id,
            user_type: UserType::from_id(user.type_id),
        }),
        Ok(false) => {
            tracing::warn!(%login, "password invalid");
            Err(AppError::BadCredentials)
        }
        Err(err) => {
            tracing::warn!(%login, error = %err, "stored password hash is unreadable");
            Err(AppError::BadCredentials)
        }
    }
}

fn verify_against_dummy(password: &str) -> bool {
    DUMMY_PASSWORD_HASH
        .as_deref()
        .and_then(|hash| password::verify_password(password, hash).ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{verify_against_dummy, Caller, DUMMY_PASSWORD_HASH};
    use crate::types::UserType;

    const ADMIN: Caller = Caller {
        user_id: 1,
        user_type: UserType::Admin,
    };
    const REGULAR: Caller = Caller {
        user_id: 7,
        user_type: UserType::Regular,
    };

    #[test]
    fn admins_may_target_other_users() {
        assert_eq!(ADMIN.target_user(Some(42)), 42);
        assert_eq!(ADMIN.target_user(None), 1);
    }

    #[test]
    fn regular_users_always_target_themselves() {
        assert_eq!(REGULAR.target_user(Some(42)), 7);
        assert_eq!(REGULAR.target_user(None), 7);
    }

    #[test]
    fn owner_scope_only_applies_to_regular_users() {
        assert_eq!(ADMIN.owner_scope(), None);
        assert_eq!(REGULAR.owner_scope(), Some(7));
        assert!(ADMIN.require_admin().is_ok());
        assert!(REGULAR.require_admin().is_err());
    }

    #[test]
    fn missing_logins_still_run_a_real_verification() {
        let hash = DUMMY_PASSWORD_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_against_dummy("anything"));
        assert!(!verify_against_dummy(""));
    }
}
