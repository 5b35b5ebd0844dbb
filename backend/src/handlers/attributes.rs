//! Product attribute handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::attributes::{
    Attribute, AttributeFilter, AttributeGroupWithAttributes, AttributeOption,
    AttributeOptionFilter, CreateAttributeGroupInput, CreateAttributeInput,
    CreateAttributeOptionInput, UpdateAttributeGroupInput, UpdateAttributeInput,
    UpdateAttributeOptionInput,
};
use crate::services::AttributeService;
use crate::AppState;
use shared::types::Page;

// ----------------------------------------------------------------------
// Attributes
// ----------------------------------------------------------------------

pub async fn list_attributes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<AttributeFilter>,
) -> Result<Json<Page<Attribute>>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let page = service.list_attributes(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_attribute(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Attribute>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let attribute = service.get_attribute(user.org_id, id).await?;
    Ok(Json(attribute))
}

pub async fn create_attribute(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateAttributeInput>,
) -> Result<(StatusCode, Json<Attribute>), AppError> {
    let service = AttributeService::new(state.db.clone());
    let attribute = service.create_attribute(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(attribute)))
}

pub async fn update_attribute(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAttributeInput>,
) -> Result<Json<Attribute>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let attribute = service.update_attribute(user.org_id, id, input).await?;
    Ok(Json(attribute))
}

pub async fn delete_attribute(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = AttributeService::new(state.db.clone());
    service.delete_attribute(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Attribute groups
// ----------------------------------------------------------------------

pub async fn list_attribute_groups(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<AttributeFilter>,
) -> Result<Json<Page<AttributeGroupWithAttributes>>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let page = service.list_groups(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_attribute_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AttributeGroupWithAttributes>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let group = service.get_group(user.org_id, id).await?;
    Ok(Json(group))
}

pub async fn create_attribute_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateAttributeGroupInput>,
) -> Result<(StatusCode, Json<AttributeGroupWithAttributes>), AppError> {
    let service = AttributeService::new(state.db.clone());
    let group = service.create_group(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn update_attribute_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAttributeGroupInput>,
) -> Result<Json<AttributeGroupWithAttributes>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let group = service.update_group(user.org_id, id, input).await?;
    Ok(Json(group))
}

pub async fn delete_attribute_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = AttributeService::new(state.db.clone());
    service.delete_group(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Attribute options
// ----------------------------------------------------------------------

pub async fn list_attribute_options(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<AttributeOptionFilter>,
) -> Result<Json<Page<AttributeOption>>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let page = service.list_options(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_attribute_option(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AttributeOption>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let option = service.get_option(user.org_id, id).await?;
    Ok(Json(option))
}

pub async fn create_attribute_option(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateAttributeOptionInput>,
) -> Result<(StatusCode, Json<AttributeOption>), AppError> {
    let service = AttributeService::new(state.db.clone());
    let option = service.create_option(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

pub async fn update_attribute_option(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAttributeOptionInput>,
) -> Result<Json<AttributeOption>, AppError> {
    let service = AttributeService::new(state.db.clone());
    let option = service.update_option(user.org_id, id, input).await?;
    Ok(Json(option))
}

pub async fn delete_attribute_option(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = AttributeService::new(state.db.clone());
    service.delete_option(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
