// subvault_server/src/lib.rs

//! HTTP service for the subvault storefront: configuration, PostgreSQL persistence,
//! staff sessions, evidence files and the actix-web routes.

pub mod config;
pub mod db;
pub mod errors;
pub mod services;
pub mod state;
pub mod web;
