use std::collections::BTreeSet;

use async_trait::async_trait;
use vendorhub_core::{AppResult, PrincipalId};
use vendorhub_domain::{
    GrantChange, GrantKey, GrantRemoval, Owner, PolicyDomain, ResourceRef, Restriction, RoleGrant,
};

/// Store of role grants shared by the authorization and membership services.
///
/// Implementations must apply each mutation atomically: a failed call leaves
/// the stored grant exactly as it was.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Unions a restriction into the grant identified by `key`, creating it
    /// when absent.
    async fn add_grant(&self, key: GrantKey, restriction: Restriction) -> AppResult<GrantChange>;

    /// Subtracts resources from a restricted grant, deleting it when its
    /// restriction set becomes empty.
    async fn remove_resources(
        &self,
        key: GrantKey,
        resources: BTreeSet<ResourceRef>,
    ) -> AppResult<GrantRemoval>;

    /// Deletes a grant regardless of its restriction.
    async fn remove_grant(&self, key: GrantKey) -> AppResult<()>;

    /// Finds one grant by key.
    async fn find_grant(&self, key: GrantKey) -> AppResult<Option<RoleGrant>>;

    /// Lists every grant held by a user in a domain.
    async fn grants_for_user(
        &self,
        user: PrincipalId,
        domain: PolicyDomain,
    ) -> AppResult<Vec<RoleGrant>>;

    /// Lists every grant scoped to an owner's resources in a domain.
    async fn grants_for_owner(
        &self,
        domain: PolicyDomain,
        owner: Owner,
    ) -> AppResult<Vec<RoleGrant>>;

    /// Drops a deleted resource from every restriction set under an owner.
    /// Returns how many grants changed.
    async fn purge_resource(
        &self,
        domain: PolicyDomain,
        owner: Owner,
        resource: &ResourceRef,
    ) -> AppResult<usize>;
}
