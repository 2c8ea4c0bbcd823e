use std::env;

use anyhow::{ensure, Context, Result};
use url::Url;

use crate::db::DEFAULT_MAX_POOL_SIZE;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub server_port: u16,
    pub page_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url_from_parts(
                &env::var("DB_HOST").context("DATABASE_URL or DB_HOST must be set")?,
                env::var("DB_PORT")
                    .unwrap_or_else(|_| "5432".to_string())
                    .parse()
                    .context("DB_PORT must be a valid u16")?,
                &env::var("DB_USER").context("DB_USER must be set")?,
                &env::var("DB_PASSWORD").unwrap_or_default(),
                &env::var("DB_NAME").context("DB_NAME must be set")?,
            )?,
        };
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let page_size: i64 = env::var("PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .context("PAGE_SIZE must be an integer")?;
        ensure!(page_size >= 1, "PAGE_SIZE must be at least 1");

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            server_port,
            page_size,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn redacted_database_url(&self) -> String {
        redact_database_url(&self.database_url)
    }
}

fn database_url_from_parts(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    name: &str,
) -> Result<String> {
    let mut url = Url::parse(&format!("postgres://{host}:{port}"))
        .with_context(|| format!("DB_HOST '{host}' is not a valid host"))?;
    url.set_username(user)
        .map_err(|_| anyhow::anyhow!("DB_USER cannot be used in a database URL"))?;
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|_| anyhow::anyhow!("DB_PASSWORD cannot be used in a database URL"))?;
    }
    url.set_path(&format!("/{name}"));
    Ok(url.to_string())
}

fn redact_database_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("*****"));
            }
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
