pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod outfit;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod uploads;
pub mod user_models;
pub mod user_storage;
