use super::*;

pub async fn list_members_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let members = state
        .membership_service
        .get_users(parse_id(vendor_id.as_str())?)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok(Json(members))
}

pub async fn member_permissions_handler(
    State(state): State<AppState>,
    Path((vendor_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<PermissionsResponse>> {
    let snapshot = state
        .membership_service
        .get_user_permissions(parse_id(vendor_id.as_str())?, parse_id(user_id.as_str())?)
        .await?;

    Ok(Json(PermissionsResponse::from(snapshot)))
}

pub async fn add_member_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((vendor_id, user_id)): Path<(String, String)>,
    Json(payload): Json<RoleMutationRequest>,
) -> ApiResult<StatusCode> {
    let vendor_id: VendorId = parse_id(vendor_id.as_str())?;
    let user_id: PrincipalId = parse_id(user_id.as_str())?;
    let role = body_role(payload.role.as_str())?;

    match payload.resources {
        Some(resources) => {
            state
                .membership_service
                .add_role_to_resources(&user, vendor_id, user_id, resource_refs(resources)?, role)
                .await?;
        }
        None => {
            state
                .membership_service
                .add_role_globally(&user, vendor_id, user_id, role)
                .await?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_member_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((vendor_id, user_id)): Path<(String, String)>,
    Json(payload): Json<RoleMutationRequest>,
) -> ApiResult<StatusCode> {
    let vendor_id: VendorId = parse_id(vendor_id.as_str())?;
    let user_id: PrincipalId = parse_id(user_id.as_str())?;
    let role = body_role(payload.role.as_str())?;

    match payload.resources {
        Some(resources) => {
            state
                .membership_service
                .remove_role_from_resources(
                    &user,
                    vendor_id,
                    user_id,
                    resource_refs(resources)?,
                    role,
                )
                .await?;
        }
        None => {
            state
                .membership_service
                .remove_role_globally(&user, vendor_id, user_id, role)
                .await?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

fn resource_refs(
    resources: Vec<crate::dto::ResourceRefPayload>,
) -> ApiResult<Vec<ResourceRef>> {
    Ok(resources
        .into_iter()
        .map(ResourceRef::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

fn body_role(value: &str) -> ApiResult<Role> {
    Role::from_str(value)
        .map_err(|_| AppError::Unprocessable(format!("unknown role '{value}'")).into())
}
