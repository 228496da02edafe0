/// Catalog CRUD operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
