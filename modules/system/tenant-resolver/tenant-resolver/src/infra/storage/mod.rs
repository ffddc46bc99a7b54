//! Storage infrastructure for the tenant resolver.

pub mod entity;
pub mod in_memory_repo;
pub mod mapper;
pub mod migrations;
pub mod sea_orm_repo;

pub use in_memory_repo::InMemoryOrganizationRepository;
pub use migrations::Migrator;
pub use sea_orm_repo::SeaOrmOrganizationRepository;
