use std::sync::Arc;

use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{
    AllowReason, AuthorizationContext, Decision, GrantKey, Owner, RoleGrant, evaluate,
};

use crate::PolicyStore;

/// Application service deciding whether a principal may act on a resource.
#[derive(Clone)]
pub struct AuthorizationService {
    policy_store: Arc<dyn PolicyStore>,
}

impl AuthorizationService {
    /// Creates a new authorization service over a policy store.
    #[must_use]
    pub fn new(policy_store: Arc<dyn PolicyStore>) -> Self {
        Self { policy_store }
    }

    /// Evaluates a context and returns the decision.
    pub async fn check(&self, context: &AuthorizationContext) -> AppResult<Decision> {
        if context.resource_owner == Owner::Principal(context.user) {
            return Ok(Decision::Allow(AllowReason::Ownership));
        }

        let grants = self.load_grants(context).await?;
        Ok(evaluate(context, grants.as_slice()))
    }

    /// Ensures the context is allowed, failing with `Forbidden` otherwise.
    pub async fn require(&self, context: &AuthorizationContext) -> AppResult<AllowReason> {
        match self.check(context).await? {
            Decision::Allow(reason) => Ok(reason),
            Decision::Deny => Err(AppError::Forbidden(format!(
                "principal '{}' may not {} {} '{}' in domain '{}'",
                context.user,
                context.action.as_str(),
                context.resource_type.as_str(),
                context.resource_id,
                context.domain.as_str()
            ))),
        }
    }

    /// Returns whether the principal holds the global super admin grant.
    pub async fn is_super_admin(&self, user: PrincipalId) -> AppResult<bool> {
        Ok(self
            .policy_store
            .find_grant(GrantKey::super_admin(user))
            .await?
            .is_some())
    }

    async fn load_grants(&self, context: &AuthorizationContext) -> AppResult<Vec<RoleGrant>> {
        let mut grants = self
            .policy_store
            .grants_for_user(context.user, context.domain)
            .await?;
        grants.retain(|grant| grant.owner == context.resource_owner);

        if let Some(super_admin) = self
            .policy_store
            .find_grant(GrantKey::super_admin(context.user))
            .await?
        {
            grants.push(super_admin);
        }

        Ok(grants)
    }
}
