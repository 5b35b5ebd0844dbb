//! Tax configuration handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::pricing::{
    CreateTaxRateInput, CreateTaxRateProfileInput, CreateTaxRegionInput, TaxRate, TaxRateFilter,
    TaxRateProfileWithRates, TaxRegion, TaxRegionFilter, UpdateTaxRateInput,
    UpdateTaxRateProfileInput, UpdateTaxRegionInput,
};
use crate::services::PricingService;
use crate::AppState;
use shared::types::Page;

// ----------------------------------------------------------------------
// Tax regions
// ----------------------------------------------------------------------

pub async fn list_tax_regions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<TaxRegionFilter>,
) -> Result<Json<Page<TaxRegion>>, AppError> {
    let service = PricingService::new(state.db.clone());
    let page = service.list_regions(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_tax_region(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TaxRegion>, AppError> {
    let service = PricingService::new(state.db.clone());
    let region = service.get_region(user.org_id, id).await?;
    Ok(Json(region))
}

pub async fn create_tax_region(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateTaxRegionInput>,
) -> Result<(StatusCode, Json<TaxRegion>), AppError> {
    let service = PricingService::new(state.db.clone());
    let region = service.create_region(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(region)))
}

pub async fn update_tax_region(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaxRegionInput>,
) -> Result<Json<TaxRegion>, AppError> {
    let service = PricingService::new(state.db.clone());
    let region = service.update_region(user.org_id, id, input).await?;
    Ok(Json(region))
}

pub async fn delete_tax_region(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = PricingService::new(state.db.clone());
    service.delete_region(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Tax rates
// ----------------------------------------------------------------------

pub async fn list_tax_rates(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<TaxRateFilter>,
) -> Result<Json<Page<TaxRate>>, AppError> {
    let service = PricingService::new(state.db.clone());
    let page = service.list_rates(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_tax_rate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TaxRate>, AppError> {
    let service = PricingService::new(state.db.clone());
    let rate = service.get_rate(user.org_id, id).await?;
    Ok(Json(rate))
}

pub async fn create_tax_rate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateTaxRateInput>,
) -> Result<(StatusCode, Json<TaxRate>), AppError> {
    let service = PricingService::new(state.db.clone());
    let rate = service.create_rate(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

pub async fn update_tax_rate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaxRateInput>,
) -> Result<Json<TaxRate>, AppError> {
    let service = PricingService::new(state.db.clone());
    let rate = service.update_rate(user.org_id, id, input).await?;
    Ok(Json(rate))
}

pub async fn delete_tax_rate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = PricingService::new(state.db.clone());
    service.delete_rate(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Tax rate profiles
// ----------------------------------------------------------------------

pub async fn list_tax_rate_profiles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<TaxRegionFilter>,
) -> Result<Json<Page<TaxRateProfileWithRates>>, AppError> {
    let service = PricingService::new(state.db.clone());
    let page = service.list_profiles(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_tax_rate_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TaxRateProfileWithRates>, AppError> {
    let service = PricingService::new(state.db.clone());
    let profile = service.get_profile(user.org_id, id).await?;
    Ok(Json(profile))
}

pub async fn create_tax_rate_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateTaxRateProfileInput>,
) -> Result<(StatusCode, Json<TaxRateProfileWithRates>), AppError> {
    let service = PricingService::new(state.db.clone());
    let profile = service.create_profile(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn update_tax_rate_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaxRateProfileInput>,
) -> Result<Json<TaxRateProfileWithRates>, AppError> {
    let service = PricingService::new(state.db.clone());
    let profile = service.update_profile(user.org_id, id, input).await?;
    Ok(Json(profile))
}

pub async fn delete_tax_rate_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = PricingService::new(state.db.clone());
    service.delete_profile(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
