//! Tax configuration service: regions, rates, and rate profiles

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::types::{Page, PageParams, Related};
use shared::validation::{validate_country_code, validate_rate_percent};

/// Service for tax master data
#[derive(Clone)]
pub struct PricingService {
    db: PgPool,
}

/// Geographic tax jurisdiction
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaxRegion {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub country_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single tax rate within a region
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaxRate {
    pub id: Uuid,
    pub org_id: Uuid,
    pub tax_region_id: Uuid,
    pub name: String,
    pub rate_percent: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Named bundle of tax rates applied to products as one unit
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaxRateProfile {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile with its member rates resolved
#[derive(Debug, Serialize)]
pub struct TaxRateProfileWithRates {
    #[serde(flatten)]
    pub profile: TaxRateProfile,
    pub rates: Vec<Related<TaxRate>>,
}

/// Minimal shape accepted when a rate is sent as an object
#[derive(Debug, Clone, Deserialize)]
pub struct TaxRateRef {
    pub id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaxRegionFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaxRateFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub tax_region_id: Option<Uuid>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaxRegionInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub country_code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaxRegionInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaxRateInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub tax_region_id: Uuid,
    pub rate_percent: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaxRateInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub rate_percent: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaxRateProfileInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    #[serde(default)]
    pub rates: Vec<Related<TaxRateRef>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaxRateProfileInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub rates: Option<Vec<Related<TaxRateRef>>>,
}

impl PricingService {
    /// Create a new PricingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Tax regions
    // ------------------------------------------------------------------

    pub async fn list_regions(
        &self,
        org_id: Uuid,
        filter: TaxRegionFilter,
    ) -> AppResult<Page<TaxRegion>> {
        let pages = PageParams::new(filter.page, filter.page_size);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tax_regions
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%'
                   OR country_code ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, TaxRegion>(
            r#"
            SELECT id, org_id, name, country_code, is_active, created_at, updated_at
            FROM tax_regions
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%'
                   OR country_code ILIKE '%' || $2 || '%')
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

    pub async fn get_region(&self, org_id: Uuid, id: Uuid) -> AppResult<TaxRegion> {
        sqlx::query_as::<_, TaxRegion>(
            r#"
            SELECT id, org_id, name, country_code, is_active, created_at, updated_at
            FROM tax_regions
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tax region".to_string()))
    }

    pub async fn create_region(
        &self,
        org_id: Uuid,
        input: CreateTaxRegionInput,
    ) -> AppResult<TaxRegion> {
        input.validate()?;
        validate_country_code(&input.country_code)
            .map_err(|m| AppError::field("country_code", m))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tax_regions WHERE org_id = $1 AND name = $2)",
        )
        .bind(org_id)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let region = sqlx::query_as::<_, TaxRegion>(
            r#"
            INSERT INTO tax_regions (org_id, name, country_code)
            VALUES ($1, $2, $3)
            RETURNING id, org_id, name, country_code, is_active, created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.country_code)
        .fetch_one(&self.db)
        .await?;

        Ok(region)
    }

    pub async fn update_region(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateTaxRegionInput,
    ) -> AppResult<TaxRegion> {
        input.validate()?;
        if let Some(country_code) = &input.country_code {
            validate_country_code(country_code)
                .map_err(|m| AppError::field("country_code", m))?;
        }

        sqlx::query_as::<_, TaxRegion>(
            r#"
            UPDATE tax_regions
            SET name = COALESCE($1, name),
                country_code = COALESCE($2, country_code),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $4 AND org_id = $5
            RETURNING id, org_id, name, country_code, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.country_code)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tax region".to_string()))
    }

    pub async fn delete_region(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tax_rates WHERE tax_region_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::Conflict {
                resource: "tax_region".to_string(),
                message: "Cannot delete a tax region with rates. Deactivate it instead."
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM tax_regions WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tax region".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Tax rates
    // ------------------------------------------------------------------

    pub async fn list_rates(
        &self,
        org_id: Uuid,
        filter: TaxRateFilter,
    ) -> AppResult<Page<TaxRate>> {
        let pages = PageParams::new(filter.page, filter.page_size);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tax_rates
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
              AND ($4::uuid IS NULL OR tax_region_id = $4)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(filter.tax_region_id)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, TaxRate>(
            r#"
            SELECT id, org_id, tax_region_id, name, rate_percent, is_active,
                   created_at, updated_at
            FROM tax_rates
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
              AND ($4::uuid IS NULL OR tax_region_id = $4)
            ORDER BY name
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(filter.tax_region_id)
        .bind(pages.limit())
        .bind(pages.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_rate(&self, org_id: Uuid, id: Uuid) -> AppResult<TaxRate> {
        sqlx::query_as::<_, TaxRate>(
            r#"
            SELECT id, org_id, tax_region_id, name, rate_percent, is_active,
                   created_at, updated_at
            FROM tax_rates
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tax rate".to_string()))
    }

    pub async fn create_rate(&self, org_id: Uuid, input: CreateTaxRateInput) -> AppResult<TaxRate> {
        input.validate()?;
        validate_rate_percent(input.rate_percent)
            .map_err(|m| AppError::field("rate_percent", m))?;

        // Region must exist in the same organization
        self.get_region(org_id, input.tax_region_id).await?;

        let rate = sqlx::query_as::<_, TaxRate>(
            r#"
            INSERT INTO tax_rates (org_id, tax_region_id, name, rate_percent)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, tax_region_id, name, rate_percent, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(input.tax_region_id)
        .bind(&input.name)
        .bind(input.rate_percent)
        .fetch_one(&self.db)
        .await?;

        Ok(rate)
    }

    pub async fn update_rate(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateTaxRateInput,
    ) -> AppResult<TaxRate> {
        input.validate()?;
        if let Some(rate_percent) = input.rate_percent {
            validate_rate_percent(rate_percent)
                .map_err(|m| AppError::field("rate_percent", m))?;
        }

        sqlx::query_as::<_, TaxRate>(
            r#"
            UPDATE tax_rates
            SET name = COALESCE($1, name),
                rate_percent = COALESCE($2, rate_percent),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $4 AND org_id = $5
            RETURNING id, org_id, tax_region_id, name, rate_percent, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.rate_percent)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tax rate".to_string()))
    }

    pub async fn delete_rate(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tax_rate_profile_rates WHERE tax_rate_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::Conflict {
                resource: "tax_rate".to_string(),
                message: "Cannot delete a tax rate used by a profile. Deactivate it instead."
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM tax_rates WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tax rate".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Tax rate profiles
    // ------------------------------------------------------------------

    pub async fn list_profiles(
        &self,
        org_id: Uuid,
        filter: TaxRegionFilter,
    ) -> AppResult<Page<TaxRateProfileWithRates>> {
        let pages = PageParams::new(filter.page, filter.page_size);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tax_rate_profiles
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

        let profiles = sqlx::query_as::<_, TaxRateProfile>(
            r#"
            SELECT id, org_id, name, is_active, created_at, updated_at
            FROM tax_rate_profiles
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

        let mut results = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let rates = self.profile_rates(profile.id).await?;
            results.push(TaxRateProfileWithRates { profile, rates });
        }

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_profile(&self, org_id: Uuid, id: Uuid) -> AppResult<TaxRateProfileWithRates> {
        let profile = sqlx::query_as::<_, TaxRateProfile>(
            r#"
            SELECT id, org_id, name, is_active, created_at, updated_at
            FROM tax_rate_profiles
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tax rate profile".to_string()))?;

        let rates = self.profile_rates(profile.id).await?;
        Ok(TaxRateProfileWithRates { profile, rates })
    }

    pub async fn create_profile(
        &self,
        org_id: Uuid,
        input: CreateTaxRateProfileInput,
    ) -> AppResult<TaxRateProfileWithRates> {
        input.validate()?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tax_rate_profiles WHERE org_id = $1 AND name = $2)",
        )
        .bind(org_id)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let rate_ids: Vec<Uuid> = input.rates.iter().map(|r| r.id_with(|x| x.id)).collect();
        self.require_rates(org_id, &rate_ids).await?;

        let mut tx = self.db.begin().await?;

        let profile = sqlx::query_as::<_, TaxRateProfile>(
            r#"
            INSERT INTO tax_rate_profiles (org_id, name)
            VALUES ($1, $2)
            RETURNING id, org_id, name, is_active, created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(&input.name)
        .fetch_one(&mut *tx)
        .await?;

        for rate_id in &rate_ids {
            sqlx::query(
                "INSERT INTO tax_rate_profile_rates (profile_id, tax_rate_id) VALUES ($1, $2)",
            )
            .bind(profile.id)
            .bind(rate_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let rates = self.profile_rates(profile.id).await?;
        Ok(TaxRateProfileWithRates { profile, rates })
    }

    pub async fn update_profile(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateTaxRateProfileInput,
    ) -> AppResult<TaxRateProfileWithRates> {
        input.validate()?;

        let rate_ids: Option<Vec<Uuid>> = input
            .rates
            .as_ref()
            .map(|rates| rates.iter().map(|r| r.id_with(|x| x.id)).collect());
        if let Some(ids) = &rate_ids {
            self.require_rates(org_id, ids).await?;
        }

        let mut tx = self.db.begin().await?;

        let profile = sqlx::query_as::<_, TaxRateProfile>(
            r#"
            UPDATE tax_rate_profiles
            SET name = COALESCE($1, name),
                is_active = COALESCE($2, is_active),
                updated_at = NOW()
            WHERE id = $3 AND org_id = $4
            RETURNING id, org_id, name, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Tax rate profile".to_string()))?;

        if let Some(ids) = &rate_ids {
            sqlx::query("DELETE FROM tax_rate_profile_rates WHERE profile_id = $1")
                .bind(profile.id)
                .execute(&mut *tx)
                .await?;

            for rate_id in ids {
                sqlx::query(
                    "INSERT INTO tax_rate_profile_rates (profile_id, tax_rate_id) VALUES ($1, $2)",
                )
                .bind(profile.id)
                .bind(rate_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        let rates = self.profile_rates(profile.id).await?;
        Ok(TaxRateProfileWithRates { profile, rates })
    }

    pub async fn delete_profile(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM tax_rate_profile_rates WHERE profile_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tax_rate_profiles WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tax rate profile".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn profile_rates(&self, profile_id: Uuid) -> AppResult<Vec<Related<TaxRate>>> {
        let rates = sqlx::query_as::<_, TaxRate>(
            r#"
            SELECT r.id, r.org_id, r.tax_region_id, r.name, r.rate_percent, r.is_active,
                   r.created_at, r.updated_at
            FROM tax_rates r
            JOIN tax_rate_profile_rates pr ON pr.tax_rate_id = r.id
            WHERE pr.profile_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rates.into_iter().map(Related::Resolved).collect())
    }

    /// Every submitted member id must name a tax rate in this
    /// organization, exactly once. Fails before anything is written.
    async fn require_rates(&self, org_id: Uuid, ids: &[Uuid]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        if let Some(dup) = super::duplicate_member(ids) {
            return Err(AppError::field(
                "rates",
                format!("Tax rate {} is listed more than once", dup),
            ));
        }

        let found = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM tax_rates WHERE id = ANY($1) AND org_id = $2",
        )
        .bind(ids)
        .bind(org_id)
        .fetch_all(&self.db)
        .await?;

        if let Some(missing) = super::missing_member(ids, &found) {
            return Err(AppError::NotFound(format!("Tax rate {}", missing)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_pool;

    #[tokio::test]
    #[ignore]
    async fn profile_rejects_unknown_rate_id() {
        let service = PricingService::new(test_pool().await);
        let org_id = Uuid::new_v4();

        let err = service
            .create_profile(
                org_id,
                CreateTaxRateProfileInput {
                    name: "Standard".to_string(),
                    rates: vec![Related::Id(Uuid::new_v4())],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Nothing was written
        let page = service
            .list_profiles(org_id, TaxRegionFilter::default())
            .await
            .unwrap();
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    #[ignore]
    async fn profile_rejects_other_org_rate_id() {
        let service = PricingService::new(test_pool().await);
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();

        let region = service
            .create_region(
                org_a,
                CreateTaxRegionInput {
                    name: "Germany".to_string(),
                    country_code: "DE".to_string(),
                },
            )
            .await
            .unwrap();
        let rate = service
            .create_rate(
                org_a,
                CreateTaxRateInput {
                    name: "VAT 19%".to_string(),
                    tax_region_id: region.id,
                    rate_percent: Decimal::new(19, 0),
                },
            )
            .await
            .unwrap();

        let err = service
            .update_profile(
                org_b,
                Uuid::new_v4(),
                UpdateTaxRateProfileInput {
                    name: None,
                    is_active: None,
                    rates: Some(vec![Related::Id(rate.id)]),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
