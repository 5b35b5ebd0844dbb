//! Catalogue master-data handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::catalogue::{
    Category, ChildEntityFilter, CreateCategoryInput, CreateDivisionInput, CreateProductInput,
    CreateSubcategoryInput, CreateUnitInput, Division, EntityFilter, Product, Subcategory,
    UnitOfMeasure, UpdateCategoryInput, UpdateDivisionInput, UpdateProductInput,
    UpdateSubcategoryInput, UpdateUnitInput,
};
use crate::services::CatalogueService;
use crate::AppState;
use shared::types::Page;

// ----------------------------------------------------------------------
// Divisions
// ----------------------------------------------------------------------

pub async fn list_divisions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<EntityFilter>,
) -> Result<Json<Page<Division>>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let page = service.list_divisions(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_division(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Division>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let division = service.get_division(user.org_id, id).await?;
    Ok(Json(division))
}

pub async fn create_division(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateDivisionInput>,
) -> Result<(StatusCode, Json<Division>), AppError> {
    let service = CatalogueService::new(state.db.clone());
    let division = service.create_division(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(division)))
}

pub async fn update_division(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDivisionInput>,
) -> Result<Json<Division>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let division = service.update_division(user.org_id, id, input).await?;
    Ok(Json(division))
}

pub async fn delete_division(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = CatalogueService::new(state.db.clone());
    service.delete_division(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Categories
// ----------------------------------------------------------------------

pub async fn list_categories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ChildEntityFilter>,
) -> Result<Json<Page<Category>>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let page = service.list_categories(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let category = service.get_category(user.org_id, id).await?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let service = CatalogueService::new(state.db.clone());
    let category = service.create_category(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> Result<Json<Category>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let category = service.update_category(user.org_id, id, input).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = CatalogueService::new(state.db.clone());
    service.delete_category(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Subcategories
// ----------------------------------------------------------------------

pub async fn list_subcategories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ChildEntityFilter>,
) -> Result<Json<Page<Subcategory>>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let page = service.list_subcategories(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_subcategory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Subcategory>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let subcategory = service.get_subcategory(user.org_id, id).await?;
    Ok(Json(subcategory))
}

pub async fn create_subcategory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSubcategoryInput>,
) -> Result<(StatusCode, Json<Subcategory>), AppError> {
    let service = CatalogueService::new(state.db.clone());
    let subcategory = service.create_subcategory(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

pub async fn update_subcategory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSubcategoryInput>,
) -> Result<Json<Subcategory>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let subcategory = service.update_subcategory(user.org_id, id, input).await?;
    Ok(Json(subcategory))
}

pub async fn delete_subcategory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = CatalogueService::new(state.db.clone());
    service.delete_subcategory(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Units of measure
// ----------------------------------------------------------------------

pub async fn list_units(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<EntityFilter>,
) -> Result<Json<Page<UnitOfMeasure>>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let page = service.list_units(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_unit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UnitOfMeasure>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let unit = service.get_unit(user.org_id, id).await?;
    Ok(Json(unit))
}

pub async fn create_unit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateUnitInput>,
) -> Result<(StatusCode, Json<UnitOfMeasure>), AppError> {
    let service = CatalogueService::new(state.db.clone());
    let unit = service.create_unit(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn update_unit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUnitInput>,
) -> Result<Json<UnitOfMeasure>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let unit = service.update_unit(user.org_id, id, input).await?;
    Ok(Json(unit))
}

pub async fn delete_unit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = CatalogueService::new(state.db.clone());
    service.delete_unit(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Products
// ----------------------------------------------------------------------

pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<EntityFilter>,
) -> Result<Json<Page<Product>>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let page = service.list_products(user.org_id, filter).await?;
    Ok(Json(page))
}

pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let product = service.get_product(user.org_id, id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let service = CatalogueService::new(state.db.clone());
    let product = service.create_product(user.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<Product>, AppError> {
    let service = CatalogueService::new(state.db.clone());
    let product = service.update_product(user.org_id, id, input).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = CatalogueService::new(state.db.clone());
    service.delete_product(user.org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
