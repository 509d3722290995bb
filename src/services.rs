pub mod auth_service;
pub mod catalog_service;
pub mod duel_service;
pub mod outfit_service;
pub mod theme_service;
pub mod vote_service;
