pub mod api_router;
pub mod auth;
pub mod config;
pub mod evaluaciones;
pub mod health;
pub mod llm;
pub mod security;
pub mod shared;
pub mod tickets;
