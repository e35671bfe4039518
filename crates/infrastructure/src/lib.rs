//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_organization_repository;
mod postgres_membership_repository;
mod postgres_role_repository;

pub use in_memory_organization_repository::InMemoryOrganizationRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_role_repository::PostgresRoleRepository;

/// Embedded SQL migrations for the organization, role and membership tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
