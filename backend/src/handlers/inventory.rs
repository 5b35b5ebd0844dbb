//! Inventory handlers: locations, reasons, stock levels, and adjustments

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    AdjustmentFilter, AdjustmentReason, AdjustmentTypeEntry, CreateAdjustmentInput,
    CreateLocationInput, CreateReasonInput, CreateStockLevelInput, FulfillmentLocation,
    LocationFilter, ReasonFilter, StockAdjustment, StockLevel, StockLevelFilter,
    UpdateLocationInput, UpdateReasonInput, UpdateStockLevelInput,
};
use crate::services::lot::{Lot, LotFilter};
use crate::services::{InventoryService, LotService};
use crate::AppState;
use shared::types::Page;

// ----------------------------------------------------------------------
// Fulfillment locations
// ----------------------------------------------------------------------

pub async fn list_locations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<LocationFilter>,
) -> Result<Json<Page<FulfillmentLocation>>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let page = service.list_locations(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_location(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FulfillmentLocation>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let location = service.get_location(user.org_id, id).await?;
    Ok(Json(location))
}

pub async fn create_location(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateLocationInput>,
) -> Result<(StatusCode, Json<FulfillmentLocation>), AppError> {
    let service = InventoryService::new(state.db.clone());
    let location = service.create_location(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn update_location(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateLocationInput>,
) -> Result<Json<FulfillmentLocation>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let location = service.update_location(user.org_id, id, input).await?;
    Ok(Json(location))
}

pub async fn delete_location(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = InventoryService::new(state.db.clone());
    service.delete_location(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Adjustment reasons
// ----------------------------------------------------------------------

pub async fn list_reasons(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ReasonFilter>,
) -> Result<Json<Page<AdjustmentReason>>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let page = service.list_reasons(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_reason(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AdjustmentReason>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let reason = service.get_reason(user.org_id, id).await?;
    Ok(Json(reason))
}

pub async fn create_reason(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateReasonInput>,
) -> Result<(StatusCode, Json<AdjustmentReason>), AppError> {
    let service = InventoryService::new(state.db.clone());
    let reason = service.create_reason(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(reason)))
}

pub async fn update_reason(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateReasonInput>,
) -> Result<Json<AdjustmentReason>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let reason = service.update_reason(user.org_id, id, input).await?;
    Ok(Json(reason))
}

pub async fn delete_reason(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = InventoryService::new(state.db.clone());
    service.delete_reason(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Stock levels
// ----------------------------------------------------------------------

pub async fn list_stock_levels(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<StockLevelFilter>,
) -> Result<Json<Page<StockLevel>>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let page = service.list_stock_levels(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_stock_level(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StockLevel>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let level = service.get_stock_level(user.org_id, id).await?;
    Ok(Json(level))
}

pub async fn create_stock_level(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateStockLevelInput>,
) -> Result<(StatusCode, Json<StockLevel>), AppError> {
    let service = InventoryService::new(state.db.clone());
    let level = service.create_stock_level(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(level)))
}

pub async fn update_stock_level(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStockLevelInput>,
) -> Result<Json<StockLevel>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let level = service.update_stock_level(user.org_id, id, input).await?;
    Ok(Json(level))
}

pub async fn delete_stock_level(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = InventoryService::new(state.db.clone());
    service.delete_stock_level(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adjustment history for one stock level, newest first.
/// The path id wins over any query-string stock_level_id.
pub async fn get_stock_level_adjustments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Query(filter): Query<AdjustmentFilter>,
) -> Result<Json<Page<StockAdjustment>>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let page = service.adjustment_history(user.org_id, id, filter).await?;
    Ok(Json(page))
}

/// Lots under one stock level
pub async fn get_stock_level_lots(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Query(filter): Query<LotFilter>,
) -> Result<Json<Page<Lot>>, AppError> {
    let service = LotService::new(state.db.clone());
    let page = service.lots_for_stock_level(user.org_id, id, filter).await?;
    Ok(Json(page))
}

// ----------------------------------------------------------------------
// Stock adjustments
// ----------------------------------------------------------------------

pub async fn list_adjustments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<AdjustmentFilter>,
) -> Result<Json<Page<StockAdjustment>>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let page = service.list_adjustments(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_adjustment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StockAdjustment>, AppError> {
    let service = InventoryService::new(state.db.clone());
    let adjustment = service.get_adjustment(user.org_id, id).await?;
    Ok(Json(adjustment))
}

pub async fn create_adjustment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateAdjustmentInput>,
) -> Result<(StatusCode, Json<StockAdjustment>), AppError> {
    let service = InventoryService::new(state.db.clone());
    let adjustment = service
        .create_adjustment(user.org_id, user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

/// Pick-list of adjustment types
pub async fn list_adjustment_types(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Json<Vec<AdjustmentTypeEntry>> {
    let service = InventoryService::new(state.db.clone());
    Json(service.adjustment_types())
}
