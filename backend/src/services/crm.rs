//! Customer master-data service: customer groups and selling channels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::types::{Page, PageParams};
use shared::validation::validate_code;

/// Service for customer segmentation and sales channels
#[derive(Clone)]
pub struct CrmService {
    db: PgPool,
}

/// Customer segment used for pricing and promotions
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerGroup {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sales channel (web store, marketplace, POS, ...)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SellingChannel {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CrmFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerGroupInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerGroupInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSellingChannelInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSellingChannelInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CrmService {
    /// Create a new CrmService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Customer groups
    // ------------------------------------------------------------------

    pub async fn list_customer_groups(
        &self,
        org_id: Uuid,
        filter: CrmFilter,
    ) -> AppResult<Page<CustomerGroup>> {
        let pages = PageParams::new(filter.page, filter.page_size);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM customer_groups
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, CustomerGroup>(
            r#"
            SELECT id, org_id, name, description, is_active, created_at, updated_at
            FROM customer_groups
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
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

    pub async fn get_customer_group(&self, org_id: Uuid, id: Uuid) -> AppResult<CustomerGroup> {
        sqlx::query_as::<_, CustomerGroup>(
            r#"
            SELECT id, org_id, name, description, is_active, created_at, updated_at
            FROM customer_groups
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer group".to_string()))
    }

    pub async fn create_customer_group(
        &self,
        org_id: Uuid,
        input: CreateCustomerGroupInput,
    ) -> AppResult<CustomerGroup> {
        input.validate()?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customer_groups WHERE org_id = $1 AND name = $2)",
        )
        .bind(org_id)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let group = sqlx::query_as::<_, CustomerGroup>(
            r#"
            INSERT INTO customer_groups (org_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, org_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(group)
    }

    pub async fn update_customer_group(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateCustomerGroupInput,
    ) -> AppResult<CustomerGroup> {
        input.validate()?;

        sqlx::query_as::<_, CustomerGroup>(
            r#"
            UPDATE customer_groups
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $4 AND org_id = $5
            RETURNING id, org_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer group".to_string()))
    }

    pub async fn delete_customer_group(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM customer_groups WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer group".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Selling channels
    // ------------------------------------------------------------------

    pub async fn list_channels(
        &self,
        org_id: Uuid,
        filter: CrmFilter,
    ) -> AppResult<Page<SellingChannel>> {
        let pages = PageParams::new(filter.page, filter.page_size);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM selling_channels
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

        let results = sqlx::query_as::<_, SellingChannel>(
            r#"
            SELECT id, org_id, name, code, description, is_active, created_at, updated_at
            FROM selling_channels
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

    pub async fn get_channel(&self, org_id: Uuid, id: Uuid) -> AppResult<SellingChannel> {
        sqlx::query_as::<_, SellingChannel>(
            r#"
            SELECT id, org_id, name, code, description, is_active, created_at, updated_at
            FROM selling_channels
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Selling channel".to_string()))
    }

    pub async fn create_channel(
        &self,
        org_id: Uuid,
        input: CreateSellingChannelInput,
    ) -> AppResult<SellingChannel> {
        input.validate()?;
        validate_code(&input.code).map_err(|m| AppError::field("code", m))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM selling_channels WHERE org_id = $1 AND code = $2)",
        )
        .bind(org_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let channel = sqlx::query_as::<_, SellingChannel>(
            r#"
            INSERT INTO selling_channels (org_id, name, code, description)
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

        Ok(channel)
    }

    pub async fn update_channel(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateSellingChannelInput,
    ) -> AppResult<SellingChannel> {
        input.validate()?;
        if let Some(code) = &input.code {
            validate_code(code).map_err(|m| AppError::field("code", m))?;
        }

        sqlx::query_as::<_, SellingChannel>(
            r#"
            UPDATE selling_channels
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
        .ok_or_else(|| AppError::NotFound("Selling channel".to_string()))
    }

    pub async fn delete_channel(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM selling_channels WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Selling channel".to_string()));
        }

        Ok(())
    }
}
