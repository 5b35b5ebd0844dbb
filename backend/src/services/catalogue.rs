//! Catalogue master-data service: divisions, categories, subcategories,
//! units of measure, and products

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::types::{Page, PageParams};
use shared::validation::{validate_code, validate_tracking_flags};

/// Catalogue service for managing the merchandise hierarchy
#[derive(Clone)]
pub struct CatalogueService {
    db: PgPool,
}

/// Top-level merchandise division
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Division {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category under a division
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub org_id: Uuid,
    pub division_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subcategory under a category
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subcategory {
    pub id: Uuid,
    pub org_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unit of measure (EA, KG, ...)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UnitOfMeasure {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sellable product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub org_id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub is_serialized: bool,
    pub is_lotted: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Common list filter for name/code entities
#[derive(Debug, Default, Deserialize)]
pub struct EntityFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl EntityFilter {
    pub fn pages(&self) -> PageParams {
        PageParams::new(self.page, self.page_size)
    }
}

/// List filter for entities with a parent link
#[derive(Debug, Default, Deserialize)]
pub struct ChildEntityFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub parent_id: Option<Uuid>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ChildEntityFilter {
    pub fn pages(&self) -> PageParams {
        PageParams::new(self.page, self.page_size)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDivisionInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDivisionInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub division_id: Uuid,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub division_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubcategoryInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub category_id: Uuid,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubcategoryInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUnitInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUnitInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    pub sku: String,
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_serialized: bool,
    #[serde(default)]
    pub is_lotted: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CatalogueService {
    /// Create a new CatalogueService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Divisions
    // ------------------------------------------------------------------

    pub async fn list_divisions(
        &self,
        org_id: Uuid,
        filter: EntityFilter,
    ) -> AppResult<Page<Division>> {
        let pages = filter.pages();
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM divisions
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, Division>(
            r#"
            SELECT id, org_id, name, code, description, is_active, created_at, updated_at
            FROM divisions
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
            ORDER BY name
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(pages.limit())
        .bind(pages.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_division(&self, org_id: Uuid, id: Uuid) -> AppResult<Division> {
        sqlx::query_as::<_, Division>(
            r#"
            SELECT id, org_id, name, code, description, is_active, created_at, updated_at
            FROM divisions
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Division".to_string()))
    }

    pub async fn create_division(
        &self,
        org_id: Uuid,
        input: CreateDivisionInput,
    ) -> AppResult<Division> {
        input.validate()?;
        validate_code(&input.code).map_err(|m| AppError::field("code", m))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM divisions WHERE org_id = $1 AND name = $2)",
        )
        .bind(org_id)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let division = sqlx::query_as::<_, Division>(
            r#"
            INSERT INTO divisions (org_id, name, code, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, name, code, description, is_active, created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(division)
    }

    pub async fn update_division(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateDivisionInput,
    ) -> AppResult<Division> {
        input.validate()?;
        if let Some(code) = &input.code {
            validate_code(code).map_err(|m| AppError::field("code", m))?;
        }

        sqlx::query_as::<_, Division>(
            r#"
            UPDATE divisions
            SET name = COALESCE($1, name),
                code = COALESCE($2, code),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5 AND org_id = $6
            RETURNING id, org_id, name, code, description, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Division".to_string()))
    }

    pub async fn delete_division(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE division_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::Conflict {
                resource: "division".to_string(),
                message: "Cannot delete a division with categories. Deactivate it instead."
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM divisions WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Division".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn list_categories(
        &self,
        org_id: Uuid,
        filter: ChildEntityFilter,
    ) -> AppResult<Page<Category>> {
        let pages = filter.pages();
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM categories
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
              AND ($4::uuid IS NULL OR division_id = $4)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(filter.parent_id)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, org_id, division_id, name, description, is_active, created_at, updated_at
            FROM categories
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
              AND ($4::uuid IS NULL OR division_id = $4)
            ORDER BY name
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(filter.parent_id)
        .bind(pages.limit())
        .bind(pages.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_category(&self, org_id: Uuid, id: Uuid) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, org_id, division_id, name, description, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    pub async fn create_category(
        &self,
        org_id: Uuid,
        input: CreateCategoryInput,
    ) -> AppResult<Category> {
        input.validate()?;
        self.require_division(org_id, input.division_id).await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (org_id, division_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, division_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(input.division_id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    pub async fn update_category(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        input.validate()?;
        if let Some(division_id) = input.division_id {
            self.require_division(org_id, division_id).await?;
        }

        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($1, name),
                division_id = COALESCE($2, division_id),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5 AND org_id = $6
            RETURNING id, org_id, division_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.division_id)
        .bind(&input.description)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    pub async fn delete_category(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM subcategories WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::Conflict {
                resource: "category".to_string(),
                message: "Cannot delete a category with subcategories. Deactivate it instead."
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Subcategories
    // ------------------------------------------------------------------

    pub async fn list_subcategories(
        &self,
        org_id: Uuid,
        filter: ChildEntityFilter,
    ) -> AppResult<Page<Subcategory>> {
        let pages = filter.pages();
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM subcategories
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
              AND ($4::uuid IS NULL OR category_id = $4)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(filter.parent_id)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, Subcategory>(
            r#"
            SELECT id, org_id, category_id, name, description, is_active, created_at, updated_at
            FROM subcategories
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
              AND ($4::uuid IS NULL OR category_id = $4)
            ORDER BY name
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(filter.parent_id)
        .bind(pages.limit())
        .bind(pages.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_subcategory(&self, org_id: Uuid, id: Uuid) -> AppResult<Subcategory> {
        sqlx::query_as::<_, Subcategory>(
            r#"
            SELECT id, org_id, category_id, name, description, is_active, created_at, updated_at
            FROM subcategories
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory".to_string()))
    }

    pub async fn create_subcategory(
        &self,
        org_id: Uuid,
        input: CreateSubcategoryInput,
    ) -> AppResult<Subcategory> {
        input.validate()?;
        self.require_category(org_id, input.category_id).await?;

        let subcategory = sqlx::query_as::<_, Subcategory>(
            r#"
            INSERT INTO subcategories (org_id, category_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, category_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(subcategory)
    }

    pub async fn update_subcategory(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateSubcategoryInput,
    ) -> AppResult<Subcategory> {
        input.validate()?;
        if let Some(category_id) = input.category_id {
            self.require_category(org_id, category_id).await?;
        }

        sqlx::query_as::<_, Subcategory>(
            r#"
            UPDATE subcategories
            SET name = COALESCE($1, name),
                category_id = COALESCE($2, category_id),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5 AND org_id = $6
            RETURNING id, org_id, category_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.category_id)
        .bind(&input.description)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory".to_string()))
    }

    pub async fn delete_subcategory(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Subcategory".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Units of measure
    // ------------------------------------------------------------------

    pub async fn list_units(
        &self,
        org_id: Uuid,
        filter: EntityFilter,
    ) -> AppResult<Page<UnitOfMeasure>> {
        let pages = filter.pages();
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM units_of_measure
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, UnitOfMeasure>(
            r#"
            SELECT id, org_id, name, code, description, is_active, created_at, updated_at
            FROM units_of_measure
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
            ORDER BY name
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(pages.limit())
        .bind(pages.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_unit(&self, org_id: Uuid, id: Uuid) -> AppResult<UnitOfMeasure> {
        sqlx::query_as::<_, UnitOfMeasure>(
            r#"
            SELECT id, org_id, name, code, description, is_active, created_at, updated_at
            FROM units_of_measure
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit of measure".to_string()))
    }

    pub async fn create_unit(
        &self,
        org_id: Uuid,
        input: CreateUnitInput,
    ) -> AppResult<UnitOfMeasure> {
        input.validate()?;
        validate_code(&input.code).map_err(|m| AppError::field("code", m))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM units_of_measure WHERE org_id = $1 AND code = $2)",
        )
        .bind(org_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let unit = sqlx::query_as::<_, UnitOfMeasure>(
            r#"
            INSERT INTO units_of_measure (org_id, name, code, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, name, code, description, is_active, created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(unit)
    }

    pub async fn update_unit(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateUnitInput,
    ) -> AppResult<UnitOfMeasure> {
        input.validate()?;
        if let Some(code) = &input.code {
            validate_code(code).map_err(|m| AppError::field("code", m))?;
        }

        sqlx::query_as::<_, UnitOfMeasure>(
            r#"
            UPDATE units_of_measure
            SET name = COALESCE($1, name),
                code = COALESCE($2, code),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5 AND org_id = $6
            RETURNING id, org_id, name, code, description, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit of measure".to_string()))
    }

    pub async fn delete_unit(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM units_of_measure WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Unit of measure".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub async fn list_products(
        &self,
        org_id: Uuid,
        filter: EntityFilter,
    ) -> AppResult<Page<Product>> {
        let pages = filter.pages();
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR sku ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, org_id, sku, name, description, is_serialized, is_lotted, is_active,
                   created_at, updated_at
            FROM products
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR sku ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
            ORDER BY name
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(pages.limit())
        .bind(pages.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_product(&self, org_id: Uuid, id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, org_id, sku, name, description, is_serialized, is_lotted, is_active,
                   created_at, updated_at
            FROM products
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn create_product(
        &self,
        org_id: Uuid,
        input: CreateProductInput,
    ) -> AppResult<Product> {
        input.validate()?;
        validate_code(&input.sku).map_err(|m| AppError::field("sku", m))?;
        validate_tracking_flags(input.is_serialized, input.is_lotted)
            .map_err(|m| AppError::field("is_lotted", m))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE org_id = $1 AND sku = $2)",
        )
        .bind(org_id)
        .bind(&input.sku)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (org_id, sku, name, description, is_serialized, is_lotted)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, org_id, sku, name, description, is_serialized, is_lotted, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(&input.sku)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_serialized)
        .bind(input.is_lotted)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    pub async fn update_product(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        input.validate()?;

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $4 AND org_id = $5
            RETURNING id, org_id, sku, name, description, is_serialized, is_lotted, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn delete_product(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_levels WHERE product_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: "Cannot delete a product with stock levels. Deactivate it instead."
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Shared lookups
    // ------------------------------------------------------------------

    async fn require_division(&self, org_id: Uuid, division_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM divisions WHERE id = $1 AND org_id = $2)",
        )
        .bind(division_id)
        .bind(org_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Division".to_string()));
        }
        Ok(())
    }

    async fn require_category(&self, org_id: Uuid, category_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND org_id = $2)",
        )
        .bind(category_id)
        .bind(org_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Category".to_string()));
        }
        Ok(())
    }
}
