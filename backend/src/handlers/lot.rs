//! Lot tracking handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::lot::{CreateLotInput, Lot, LotFilter, UpdateLotInput};
use crate::services::LotService;
use crate::AppState;
use shared::types::Page;

pub async fn list_lots(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<LotFilter>,
) -> Result<Json<Page<Lot>>, AppError> {
    let service = LotService::new(state.db.clone());
    let page = service.list_lots(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_lot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Lot>, AppError> {
    let service = LotService::new(state.db.clone());
    let lot = service.get_lot(user.org_id, id).await?;
    Ok(Json(lot))
}

pub async fn create_lot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateLotInput>,
) -> Result<(StatusCode, Json<Lot>), AppError> {
    let service = LotService::new(state.db.clone());
    let lot = service.create_lot(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(lot)))
}

pub async fn update_lot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateLotInput>,
) -> Result<Json<Lot>, AppError> {
    let service = LotService::new(state.db.clone());
    let lot = service.update_lot(user.org_id, id, input).await?;
    Ok(Json(lot))
}

pub async fn delete_lot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = LotService::new(state.db.clone());
    service.delete_lot(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
