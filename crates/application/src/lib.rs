//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod authorization_ports;
mod authorization_service;
mod catalog_ports;
mod catalog_service;
mod membership_service;
mod ownership_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_ports::PolicyStore;
pub use authorization_service::AuthorizationService;
pub use catalog_ports::CatalogRepository;
pub use catalog_service::CatalogService;
pub use membership_service::{
    MembershipService, PermissionsSnapshot, ResourceMeta, ResourceView, RoleView, UserRoleView,
};
pub use ownership_service::{Ownership, OwnershipService, canonical_resource_id};
pub use user_service::{UserRepository, UserService};
