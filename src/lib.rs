pub mod audit;
pub mod auth;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod roster;
pub mod templates_structs;
