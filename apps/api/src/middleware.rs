use std::sync::Arc;

use axum::extract::{MatchedPath, RawPathParams, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use vendorhub_core::{AppError, UserIdentity};
use vendorhub_domain::{Action, AuthorizationContext};

use crate::error::ApiResult;
use crate::permissions::RoutePermissionTable;
use crate::state::AppState;

pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";
pub const SUBJECT_HEADER: &str = "x-authenticated-subject";
pub const EMAIL_HEADER: &str = "x-authenticated-email";
pub const NAME_HEADER: &str = "x-authenticated-name";

/// State of the permission middleware.
#[derive(Clone)]
pub struct PermissionGate {
    pub state: AppState,
    pub table: Arc<RoutePermissionTable>,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let headers = request.headers();

    let presented_secret = header_value(headers, GATEWAY_SECRET_HEADER)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    if !secrets_match(state.gateway_secret.as_bytes(), presented_secret.as_bytes()) {
        return Err(AppError::Unauthorized("authentication required".to_owned()).into());
    }

    let subject = header_value(headers, SUBJECT_HEADER)
        .filter(|subject| !subject.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let identity = UserIdentity::new(
        subject.trim(),
        header_value(headers, NAME_HEADER).unwrap_or_default(),
        header_value(headers, EMAIL_HEADER)
            .filter(|email| !email.trim().is_empty())
            .map(str::to_owned),
    );

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_route_permission(
    State(gate): State<PermissionGate>,
    params: RawPathParams,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_default();
    let Some(permission) = gate.table.get(route.as_str()).copied() else {
        warn!(route = %route, "denied request to route without permission entry");
        return Err(AppError::Forbidden(format!("route '{route}' is not permitted")).into());
    };

    let identity = request
        .extensions()
        .get::<UserIdentity>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let user = gate
        .state
        .user_service
        .resolve_principal(identity.subject())
        .await?;

    let resolved = permission
        .resolve(&params, user, &gate.state.ownership_service)
        .await?;

    let context = AuthorizationContext {
        domain: permission.domain,
        user,
        resource_type: permission.resource_type,
        resource_id: resolved.resource_id,
        resource_owner: resolved.owner,
        action: Action::for_http_method(request.method().as_str()),
    };

    match gate.state.authorization_service.require(&context).await {
        Ok(reason) => {
            debug!(
                route = %route,
                principal = %user,
                resource_type = context.resource_type.as_str(),
                resource_id = %context.resource_id,
                action = context.action.as_str(),
                reason = ?reason,
                "allowed request"
            );
        }
        Err(error) => {
            warn!(
                route = %route,
                principal = %user,
                resource_type = context.resource_type.as_str(),
                resource_id = %context.resource_id,
                action = context.action.as_str(),
                "denied request"
            );
            return Err(error.into());
        }
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn secrets_match(expected: &[u8], presented: &[u8]) -> bool {
    if expected.len() != presented.len() {
        return false;
    }

    expected.ct_eq(presented).into()
}

#[cfg(test)]
mod tests {
    use super::secrets_match;

    #[test]
    fn secrets_must_match_exactly() {
        assert!(secrets_match(b"shared-secret", b"shared-secret"));
        assert!(!secrets_match(b"shared-secret", b"shared-secreT"));
        assert!(!secrets_match(b"shared-secret", b"shared"));
        assert!(!secrets_match(b"shared-secret", b""));
    }
}
