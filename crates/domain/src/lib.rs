//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod authorization;
mod catalog;
mod grant;
mod policy;
mod security;
mod user;

pub use authorization::{
    Action, AllowReason, AuthorizationContext, Decision, GLOBAL_MARKER, Owner, PolicyAction,
    PolicyDomain, ResourceType, Role,
};
pub use catalog::{Bundle, BundleId, Game, GameId, Package, PackageId, Vendor, VendorId};
pub use grant::{
    GrantChange, GrantKey, GrantRemoval, ResourceRef, Restriction, RestrictionPurge, RoleGrant,
    evaluate,
};
pub use policy::{DomainPolicy, PolicyEntry};
pub use security::AuditAction;
pub use user::{EmailAddress, UserAccount};
