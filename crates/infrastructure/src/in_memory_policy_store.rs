use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use vendorhub_application::PolicyStore;
use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{
    GrantChange, GrantKey, GrantRemoval, Owner, PolicyDomain, ResourceRef, Restriction,
    RestrictionPurge, RoleGrant,
};

/// In-memory policy store.
///
/// One lock guards the whole grant table. Callers must not perform I/O while
/// a guard is alive, so every method copies what it needs out of the table.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    grants: RwLock<HashMap<GrantKey, Restriction>>,
}

impl InMemoryPolicyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn collect(&self, matches: impl Fn(&GrantKey) -> bool) -> Vec<RoleGrant> {
        let grants = self.grants.read().await;
        let mut selected: Vec<RoleGrant> = grants
            .iter()
            .filter(|(key, _)| matches(key))
            .map(|(key, restriction)| RoleGrant::new(*key, restriction.clone()))
            .collect();
        selected.sort_by_key(RoleGrant::key);
        selected
    }
}

fn missing_grant(key: &GrantKey) -> AppError {
    AppError::NotFound(format!(
        "user '{}' holds no role '{}' for owner '{}'",
        key.user,
        key.role.as_str(),
        key.owner
    ))
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn add_grant(&self, key: GrantKey, restriction: Restriction) -> AppResult<GrantChange> {
        let mut grants = self.grants.write().await;
        let (merged, change) = Restriction::merge(grants.get(&key), &restriction);
        if change != GrantChange::Unchanged {
            grants.insert(key, merged);
        }

        Ok(change)
    }

    async fn remove_resources(
        &self,
        key: GrantKey,
        resources: BTreeSet<ResourceRef>,
    ) -> AppResult<GrantRemoval> {
        let mut grants = self.grants.write().await;
        let current = grants.get(&key).ok_or_else(|| missing_grant(&key))?;

        match current.without(&resources)? {
            Some(remaining) => {
                grants.insert(key, remaining);
                Ok(GrantRemoval::Narrowed)
            }
            None => {
                grants.remove(&key);
                Ok(GrantRemoval::Deleted)
            }
        }
    }

    async fn remove_grant(&self, key: GrantKey) -> AppResult<()> {
        self.grants
            .write()
            .await
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| missing_grant(&key))
    }

    async fn find_grant(&self, key: GrantKey) -> AppResult<Option<RoleGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .get(&key)
            .map(|restriction| RoleGrant::new(key, restriction.clone())))
    }

    async fn grants_for_user(
        &self,
        user: PrincipalId,
        domain: PolicyDomain,
    ) -> AppResult<Vec<RoleGrant>> {
        Ok(self
            .collect(|key| key.user == user && key.domain == domain)
            .await)
    }

    async fn grants_for_owner(
        &self,
        domain: PolicyDomain,
        owner: Owner,
    ) -> AppResult<Vec<RoleGrant>> {
        Ok(self
            .collect(|key| key.domain == domain && key.owner == owner)
            .await)
    }

    async fn purge_resource(
        &self,
        domain: PolicyDomain,
        owner: Owner,
        resource: &ResourceRef,
    ) -> AppResult<usize> {
        let mut grants = self.grants.write().await;
        let mut changed = 0;

        grants.retain(|key, restriction| {
            if key.domain != domain || key.owner != owner {
                return true;
            }

            match restriction.purge(resource) {
                RestrictionPurge::Untouched => true,
                RestrictionPurge::Narrowed(remaining) => {
                    *restriction = remaining;
                    changed += 1;
                    true
                }
                RestrictionPurge::Emptied => {
                    changed += 1;
                    false
                }
            }
        });

        Ok(changed)
    }
}
