pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod packages;
pub mod payload;
pub mod registry;
pub mod routes;
pub mod schema;
pub mod state;
pub mod types;
pub mod utils;
pub mod validation;
