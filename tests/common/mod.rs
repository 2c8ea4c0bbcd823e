use std::env;

use anyhow::{anyhow, Context, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::PgConnection;
use http_body_util::BodyExt;
use once_cell::sync::Lazy;
use registry::auth::{password, LOGIN_HEADER, PASSWORD_HEADER};
use registry::config::{AppConfig, DEFAULT_PAGE_SIZE};
use registry::db::{self, PgPool};
use registry::models::NewUser;
use registry::routes;
use registry::state::AppState;
use registry::types::UserType;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[allow(dead_code)]
pub const ADMIN_ID: i32 = 1;
pub const ADMIN_LOGIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pass";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Builds the app against `TEST_DATABASE_URL` with an administrator in place.
    pub async fn new() -> Result<Self> {
        let database_url = env::var("TEST_DATABASE_URL")
            .context("TEST_DATABASE_URL must be set for integration tests")?;

        let config = AppConfig {
            database_url,
            database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            page_size: DEFAULT_PAGE_SIZE,
        };

        let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
        prepare_database(&pool).await?;

        let state = AppState::new(pool, config);
        let router = routes::create_router(state.clone());
        let app = Self { state, router };
        app.insert_user(ADMIN_ID, ADMIN_LOGIN, ADMIN_PASSWORD, UserType::Admin)
            .await?;
        Ok(app)
    }

    pub async fn cleanup(&self) -> Result<()> {
        self.with_conn(clear_tables).await
    }

    pub async fn insert_user(
        &self,
        id: i32,
        login: &str,
        plain_password: &str,
        user_type: UserType,
    ) -> Result<()> {
        let login = login.to_string();
        let plain_password = plain_password.to_string();
        self.with_conn(move |conn| {
            let user = NewUser {
                id,
                last_name: format!("{login} last name"),
                first_name: None,
                patr_name: None,
                gender_id: None,
                type_id: Some(user_type.id()),
                login: Some(login),
                password: Some(password::hash_password(&plain_password)?),
                create_datetime: None,
                create_user_id: None,
            };
            diesel::insert_into(registry::schema::users::table)
                .values(&user)
                .execute(conn)
                .context("failed to insert user")?;
            Ok(())
        })
        .await
    }

    /// Sends a request carrying `login`/`password` headers when credentials are given.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
        credentials: Option<(&str, &str)>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some((login, password)) = credentials {
            builder = builder
                .header(LOGIN_HEADER, login)
                .header(PASSWORD_HEADER, password);
        }
        let body = match payload {
            Some(payload) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(payload)?)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body)?)
            .await
            .expect("infallible response");
        let status = response.status();
        let bytes = body_to_vec(response.into_body()).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, json))
    }

    #[allow(dead_code)]
    pub async fn as_admin(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<(StatusCode, Value)> {
        self.request(method, path, payload, Some((ADMIN_LOGIN, ADMIN_PASSWORD)))
            .await
    }

    /// Raw JSON payloads of a user's documents, active or not, ordered by id.
    #[allow(dead_code)]
    pub async fn stored_documents(&self, user_id: i32) -> Result<Vec<(i32, i32, i32, Value)>> {
        self.with_conn(move |conn| {
            use registry::schema::documents;
            let rows: Vec<(i32, Option<i32>, i32, Option<String>)> = documents::table
                .filter(documents::user_id.eq(user_id))
                .order(documents::id.asc())
                .select((
                    documents::id,
                    documents::type_id,
                    documents::deleted,
                    documents::data,
                ))
                .load(conn)
                .context("failed to load documents")?;
            rows.into_iter()
                .map(|(id, type_id, deleted, data)| -> Result<_> {
                    let data = serde_json::from_str(data.as_deref().unwrap_or("null"))?;
                    Ok((id, type_id.unwrap_or_default(), deleted, data))
                })
                .collect()
        })
        .await
    }

    #[allow(dead_code)]
    pub async fn count_rows(&self, table: &'static str) -> Result<i64> {
        self.with_conn(move |conn| {
            #[derive(QueryableByName)]
            struct Count {
                #[diesel(sql_type = diesel::sql_types::BigInt)]
                total: i64,
            }
            let row: Count = diesel::sql_query(format!("SELECT COUNT(*) AS total FROM {table}"))
                .get_result(conn)
                .context("failed to count rows")?;
            Ok(row.total)
        })
        .await
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PgConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.state.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| anyhow!("failed to get database connection: {err}"))?;
            f(&mut conn)
        })
        .await
        .context("connection task panicked")?
    }
}

pub async fn acquire_db_lock() -> tokio::sync::MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

async fn prepare_database(pool: &PgPool) -> Result<()> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut conn = pool
            .get()
            .map_err(|err| anyhow!("failed to acquire connection: {err}"))?;
        db::run_migrations(&mut conn)?;
        clear_tables(&mut conn)?;
        Ok(())
    })
    .await
    .context("migration task panicked")?
}

/// Clears everything the flows write. Reference tables point at `users`
/// through their audit columns, so rows are deleted rather than truncated
/// with CASCADE, which would also empty the seeded types.
fn clear_tables(conn: &mut PgConnection) -> Result<()> {
    conn.batch_execute(
        "DELETE FROM documents;
         DELETE FROM organizations;
         DELETE FROM users;
         ALTER TABLE documents ALTER COLUMN id RESTART WITH 1;
         ALTER SEQUENCE organizations_id_seq RESTART WITH 1;",
    )
    .context("failed to clear tables")?;
    Ok(())
}

/// A package with one sender and one user holding a passport, plus a SNILS
/// number supplied on the user.
#[allow(dead_code)]
pub fn sample_package(package_id: i64, user_id: i32, document_id: i32, login: &str) -> Value {
    serde_json::json!({
        "id": package_id,
        "referralGUID": "ABC123456789012345:ABCDEF",
        "referralDate": "2024-02-09T10:30:00",
        "Data": [{
            "Sender": {"Organization": {"oid": "1.2.643.5", "fullName": "City Clinic"}},
            "Users": [{
                "id": user_id,
                "lastName": "Ivanova",
                "firstName": "Anna",
                "patrName": "Petrovna",
                "birthDate": "1990-04-12",
                "sex": 2,
                "phoneNumber": 79990001122i64,
                "snils": "12345678901",
                "Credentials": {"username": login, "password": "user-pass"},
                "Address": {"value": "Main st. 1"},
                "Documents": [{
                    "id": document_id,
                    "documentType_id": 1,
                    "documentType_name": "Passport",
                    "series": "4501",
                    "number": "123456",
                    "beginDate": "2015-06-01",
                    "orgDep_Name": "Department 12",
                    "issuerCode": "770-001"
                }]
            }]
        }]
    })
}
