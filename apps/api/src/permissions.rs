//! Route permission table and per-family owner lookups.
//!
//! Every route behind the permission middleware registers one entry here
//! together with its handler. A matched route without an entry is denied.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::RawPathParams;
use vendorhub_application::{OwnershipService, canonical_resource_id};
use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{GLOBAL_MARKER, Owner, PolicyDomain, ResourceType, VendorId};

/// Path parameter naming the vendor a sub-resource is addressed through.
pub const VENDOR_PARAM: &str = "vendor_id";

/// Path parameter naming the member a membership route addresses.
pub const USER_PARAM: &str = "user_id";

/// How a route addresses the resource it acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceParam {
    /// Domain-global route, evaluated against the `*` resource.
    Global,
    /// The resource id is read from this path parameter.
    Path(&'static str),
}

/// Strategy resolving the owner of a route's resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerLookup {
    /// The caller owns what it creates or lists for itself.
    Caller,
    /// Platform resources without a principal owner.
    Global,
    /// Resource id is a vendor id; owned by its manager.
    Vendor,
    /// Like `Vendor`, but a caller addressing itself through `user_id`
    /// owns the resource.
    VendorMember,
    /// Resource id is a game of the vendor in the path.
    Game,
    /// Resource id is a package of the vendor in the path.
    Package,
    /// Resource id is a bundle of the vendor in the path.
    Bundle,
}

/// Permission entry registered for one route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePermission {
    pub resource: ResourceParam,
    pub resource_type: ResourceType,
    pub domain: PolicyDomain,
    pub owner_lookup: OwnerLookup,
}

impl RoutePermission {
    pub const fn new(
        resource: ResourceParam,
        resource_type: ResourceType,
        domain: PolicyDomain,
        owner_lookup: OwnerLookup,
    ) -> Self {
        Self {
            resource,
            resource_type,
            domain,
            owner_lookup,
        }
    }
}

/// Resource and owner a request acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub resource_id: String,
    pub owner: Owner,
}

/// Route pattern to permission entry map, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RoutePermissionTable {
    entries: HashMap<&'static str, RoutePermission>,
}

impl RoutePermissionTable {
    pub fn insert(&mut self, route: &'static str, permission: RoutePermission) {
        self.entries.insert(route, permission);
    }

    pub fn get(&self, route: &str) -> Option<&RoutePermission> {
        self.entries.get(route)
    }
}

impl RoutePermission {
    /// Resolves the addressed resource and its owner for one request.
    ///
    /// Malformed ids fail with `Validation`, missing resources and
    /// sub-resources of another vendor with `NotFound`.
    pub async fn resolve(
        &self,
        params: &RawPathParams,
        caller: PrincipalId,
        ownership: &OwnershipService,
    ) -> AppResult<ResolvedResource> {
        let raw_id = match self.resource {
            ResourceParam::Global => None,
            ResourceParam::Path(name) => Some(path_param(params, name)?),
        };

        match (self.owner_lookup, raw_id) {
            (OwnerLookup::Caller, _) => Ok(ResolvedResource {
                resource_id: GLOBAL_MARKER.to_owned(),
                owner: Owner::Principal(caller),
            }),
            (OwnerLookup::Global, None) => Ok(ResolvedResource {
                resource_id: GLOBAL_MARKER.to_owned(),
                owner: Owner::Global,
            }),
            (OwnerLookup::Global, Some(raw_id)) => Ok(ResolvedResource {
                resource_id: canonical_resource_id(self.resource_type, raw_id)?,
                owner: Owner::Global,
            }),
            (OwnerLookup::Vendor, Some(raw_id)) => {
                let resolved = ownership.resolve(ResourceType::Vendor, raw_id).await?;
                Ok(ResolvedResource {
                    resource_id: resolved.resource_id,
                    owner: Owner::Principal(resolved.owner),
                })
            }
            (OwnerLookup::VendorMember, Some(raw_id)) => {
                let resolved = ownership.resolve(ResourceType::Vendor, raw_id).await?;
                let addressed = PrincipalId::from_str(path_param(params, USER_PARAM)?)?;
                let owner = if addressed == caller {
                    caller
                } else {
                    resolved.owner
                };
                Ok(ResolvedResource {
                    resource_id: resolved.resource_id,
                    owner: Owner::Principal(owner),
                })
            }
            (OwnerLookup::Game, Some(raw_id)) => {
                resolve_sub_resource(params, ResourceType::Game, raw_id, ownership).await
            }
            (OwnerLookup::Package, Some(raw_id)) => {
                resolve_sub_resource(params, ResourceType::Package, raw_id, ownership).await
            }
            (OwnerLookup::Bundle, Some(raw_id)) => {
                resolve_sub_resource(params, ResourceType::Bundle, raw_id, ownership).await
            }
            (lookup, None) => Err(AppError::Internal(format!(
                "owner lookup {lookup:?} requires a resource path parameter"
            ))),
        }
    }
}

async fn resolve_sub_resource(
    params: &RawPathParams,
    family: ResourceType,
    raw_id: &str,
    ownership: &OwnershipService,
) -> AppResult<ResolvedResource> {
    let scope = VendorId::from_str(path_param(params, VENDOR_PARAM)?)?;
    let resolved = ownership.resolve(family, raw_id).await?;
    if resolved.vendor_id != scope {
        return Err(AppError::NotFound(format!(
            "{} '{}' not found for vendor '{scope}'",
            family.as_str(),
            resolved.resource_id
        )));
    }

    Ok(ResolvedResource {
        resource_id: resolved.resource_id,
        owner: Owner::Principal(resolved.owner),
    })
}

fn path_param<'a>(params: &'a RawPathParams, name: &str) -> AppResult<&'a str> {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .ok_or_else(|| AppError::Internal(format!("route is missing path parameter '{name}'")))
}
