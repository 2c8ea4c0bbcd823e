use std::env;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use diesel::prelude::*;

use registry::{
    auth::password,
    config::AppConfig,
    db,
    models::NewUser,
    schema::users,
    types::UserType,
};

const USAGE: &str = "Usage:\n  maintenance migrate\n  maintenance create-admin <id> <login> <password> [last-name]";

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).compact().init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("migrate") => migrate(),
        Some("create-admin") => create_admin(&args[1..]),
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}

fn connect() -> Result<db::PgPool> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "maintenance",
        database_url = %config.redacted_database_url(),
        "loaded registry configuration"
    );
    db::init_pool_with_size(&config.database_url, 1)
}

fn migrate() -> Result<()> {
    let pool = connect()?;
    let mut conn = pool.get().context("failed to get database connection")?;
    let applied = db::run_migrations(&mut conn)?;
    println!("Applied {applied} migration(s).");
    Ok(())
}

fn create_admin(args: &[String]) -> Result<()> {
    let (id, login, plain_password) = match args {
        [id, login, plain_password, ..] => (id, login, plain_password),
        _ => bail!("create-admin needs <id> <login> <password>\n{USAGE}"),
    };
    let id: i32 = id.parse().context("id must be an integer")?;
    let last_name = args.get(3).cloned().unwrap_or_else(|| "Administrator".to_string());

    let pool = connect()?;
    let mut conn = pool.get().context("failed to get database connection")?;
    db::run_migrations(&mut conn)?;

    diesel::insert_into(users::table)
        .values(&NewUser {
            id,
            last_name,
            first_name: None,
            patr_name: None,
            gender_id: None,
            type_id: Some(UserType::Admin.id()),
            login: Some(login.clone()),
            password: Some(password::hash_password(plain_password)?),
            create_datetime: Some(Utc::now().naive_utc()),
            create_user_id: None,
        })
        .execute(&mut conn)
        .with_context(|| format!("failed to create administrator '{login}'"))?;

    println!("Administrator '{login}' created with id {id}.");
    Ok(())
}
