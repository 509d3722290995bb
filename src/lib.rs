pub mod app;
pub mod composer;
pub mod config;
pub mod duel;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod validation;
