//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_catalog_repository;
mod in_memory_policy_store;
mod in_memory_user_repository;
mod postgres_audit_repository;
mod postgres_catalog_repository;
mod postgres_policy_store;
mod postgres_user_repository;
mod tracing_audit_repository;

pub use in_memory_catalog_repository::InMemoryCatalogRepository;
pub use in_memory_policy_store::InMemoryPolicyStore;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_catalog_repository::PostgresCatalogRepository;
pub use postgres_policy_store::PostgresPolicyStore;
pub use postgres_user_repository::PostgresUserRepository;
pub use tracing_audit_repository::TracingAuditRepository;
