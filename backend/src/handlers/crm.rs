//! Customer group and selling channel handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::crm::{
    CreateCustomerGroupInput, CreateSellingChannelInput, CrmFilter, CustomerGroup, SellingChannel,
    UpdateCustomerGroupInput, UpdateSellingChannelInput,
};
use crate::services::CrmService;
use crate::AppState;
use shared::types::Page;

// ----------------------------------------------------------------------
// Customer groups
// ----------------------------------------------------------------------

pub async fn list_customer_groups(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<CrmFilter>,
) -> Result<Json<Page<CustomerGroup>>, AppError> {
    let service = CrmService::new(state.db.clone());
    let page = service.list_customer_groups(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_customer_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerGroup>, AppError> {
    let service = CrmService::new(state.db.clone());
    let group = service.get_customer_group(user.org_id, id).await?;
    Ok(Json(group))
}

pub async fn create_customer_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateCustomerGroupInput>,
) -> Result<(StatusCode, Json<CustomerGroup>), AppError> {
    let service = CrmService::new(state.db.clone());
    let group = service.create_customer_group(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn update_customer_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCustomerGroupInput>,
) -> Result<Json<CustomerGroup>, AppError> {
    let service = CrmService::new(state.db.clone());
    let group = service.update_customer_group(user.org_id, id, input).await?;
    Ok(Json(group))
}

pub async fn delete_customer_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = CrmService::new(state.db.clone());
    service.delete_customer_group(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Selling channels
// ----------------------------------------------------------------------

pub async fn list_channels(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<CrmFilter>,
) -> Result<Json<Page<SellingChannel>>, AppError> {
    let service = CrmService::new(state.db.clone());
    let page = service.list_channels(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_channel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SellingChannel>, AppError> {
    let service = CrmService::new(state.db.clone());
    let channel = service.get_channel(user.org_id, id).await?;
    Ok(Json(channel))
}

pub async fn create_channel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSellingChannelInput>,
) -> Result<(StatusCode, Json<SellingChannel>), AppError> {
    let service = CrmService::new(state.db.clone());
    let channel = service.create_channel(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(channel)))
}

pub async fn update_channel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSellingChannelInput>,
) -> Result<Json<SellingChannel>, AppError> {
    let service = CrmService::new(state.db.clone());
    let channel = service.update_channel(user.org_id, id, input).await?;
    Ok(Json(channel))
}

pub async fn delete_channel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = CrmService::new(state.db.clone());
    service.delete_channel(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
