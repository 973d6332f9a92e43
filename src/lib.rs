pub mod api_structs;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod db;
pub mod directory;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod search;
pub mod views;
