pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod routes;
pub mod schema;
pub mod state;
