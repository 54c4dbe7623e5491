pub mod auth_service;
pub mod workspace_service;
