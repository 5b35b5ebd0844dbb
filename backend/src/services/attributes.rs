//! Product attribute service: attributes, attribute groups, and options

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::AttributeDataType;
use shared::types::{Page, PageParams, Related};

/// Service for the product attribute dictionary
#[derive(Clone)]
pub struct AttributeService {
    db: PgPool,
}

/// Attribute definition
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attribute {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub code: String,
    pub data_type: String,
    pub is_required: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Named bundle of attributes
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttributeGroup {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attribute group with its member attributes resolved
#[derive(Debug, Serialize)]
pub struct AttributeGroupWithAttributes {
    #[serde(flatten)]
    pub group: AttributeGroup,
    pub attributes: Vec<Attribute>,
}

/// Allowed value for a select attribute
#[derive(Debug, Serialize)]
pub struct AttributeOption {
    pub id: Uuid,
    pub org_id: Uuid,
    pub attribute: Related<Attribute>,
    pub label: String,
    pub value: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct AttributeOptionRow {
    id: Uuid,
    org_id: Uuid,
    attribute_id: Uuid,
    label: String,
    value: String,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    attr_name: String,
    attr_code: String,
    attr_data_type: String,
    attr_is_required: bool,
    attr_is_active: bool,
    attr_created_at: DateTime<Utc>,
    attr_updated_at: DateTime<Utc>,
}

impl AttributeOptionRow {
    fn into_option(self) -> AttributeOption {
        AttributeOption {
            id: self.id,
            org_id: self.org_id,
            attribute: Related::Resolved(Attribute {
                id: self.attribute_id,
                org_id: self.org_id,
                name: self.attr_name,
                code: self.attr_code,
                data_type: self.attr_data_type,
                is_required: self.attr_is_required,
                is_active: self.attr_is_active,
                created_at: self.attr_created_at,
                updated_at: self.attr_updated_at,
            }),
            label: self.label,
            value: self.value,
            sort_order: self.sort_order,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AttributeFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub data_type: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttributeOptionFilter {
    pub attribute_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttributeInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub code: String,
    pub data_type: AttributeDataType,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAttributeInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub is_required: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttributeGroupInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    #[serde(default)]
    pub attribute_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAttributeGroupInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub attribute_ids: Option<Vec<Uuid>>,
}

/// Minimal shape accepted when the attribute is sent as an object
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeRef {
    pub id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttributeOptionInput {
    pub attribute: Related<AttributeRef>,
    #[validate(length(min = 1, max = 255, message = "Label must be 1-255 characters"))]
    pub label: String,
    #[validate(length(min = 1, max = 255, message = "Value must be 1-255 characters"))]
    pub value: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAttributeOptionInput {
    #[validate(length(min = 1, max = 255, message = "Label must be 1-255 characters"))]
    pub label: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Value must be 1-255 characters"))]
    pub value: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

const OPTION_SELECT: &str = r#"
    SELECT o.id, o.org_id, o.attribute_id, o.label, o.value, o.sort_order, o.is_active,
           o.created_at, o.updated_at,
           a.name AS attr_name, a.code AS attr_code, a.data_type AS attr_data_type,
           a.is_required AS attr_is_required, a.is_active AS attr_is_active, a.created_at AS attr_created_at,
           a.updated_at AS attr_updated_at
    FROM attribute_options o
    JOIN attributes a ON a.id = o.attribute_id
"#;

impl AttributeService {
    /// Create a new AttributeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub async fn list_attributes(
        &self,
        org_id: Uuid,
        filter: AttributeFilter,
    ) -> AppResult<Page<Attribute>> {
        let pages = PageParams::new(filter.page, filter.page_size);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM attributes
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
              AND ($4::text IS NULL OR data_type = $4)
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(&filter.data_type)
        .fetch_one(&self.db)
        .await?;

        let results = sqlx::query_as::<_, Attribute>(
            r#"
            SELECT id, org_id, name, code, data_type, is_required, is_active, created_at,
                   updated_at
            FROM attributes
            WHERE org_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR is_active = $3)
              AND ($4::text IS NULL OR data_type = $4)
            ORDER BY name
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(org_id)
        .bind(&filter.search)
        .bind(filter.is_active)
        .bind(&filter.data_type)
        .bind(pages.limit())
        .bind(pages.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_attribute(&self, org_id: Uuid, id: Uuid) -> AppResult<Attribute> {
        sqlx::query_as::<_, Attribute>(
            r#"
            SELECT id, org_id, name, code, data_type, is_required, is_active, created_at,
                   updated_at
            FROM attributes
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Attribute".to_string()))
    }

    pub async fn create_attribute(
        &self,
        org_id: Uuid,
        input: CreateAttributeInput,
    ) -> AppResult<Attribute> {
        input.validate()?;
        shared::validation::validate_code(&input.code)
            .map_err(|m| AppError::field("code", m))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attributes WHERE org_id = $1 AND code = $2)",
        )
        .bind(org_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let attribute = sqlx::query_as::<_, Attribute>(
            r#"
            INSERT INTO attributes (org_id, name, code, data_type, is_required)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, org_id, name, code, data_type, is_required, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.data_type.as_str())
        .bind(input.is_required)
        .fetch_one(&self.db)
        .await?;

        Ok(attribute)
    }

    /// Update an attribute. The code and data type are immutable once
    /// options or values may reference them.
    pub async fn update_attribute(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateAttributeInput,
    ) -> AppResult<Attribute> {
        input.validate()?;

        sqlx::query_as::<_, Attribute>(
            r#"
            UPDATE attributes
            SET name = COALESCE($1, name),
                is_required = COALESCE($2, is_required),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $4 AND org_id = $5
            RETURNING id, org_id, name, code, data_type, is_required, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.is_required)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Attribute".to_string()))
    }

    pub async fn delete_attribute(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attribute_options WHERE attribute_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::Conflict {
                resource: "attribute".to_string(),
                message: "Cannot delete an attribute with options. Deactivate it instead."
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM attributes WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Attribute".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Attribute groups
    // ------------------------------------------------------------------

    pub async fn list_groups(
        &self,
        org_id: Uuid,
        filter: AttributeFilter,
    ) -> AppResult<Page<AttributeGroupWithAttributes>> {
        let pages = PageParams::new(filter.page, filter.page_size);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM attribute_groups
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

        let groups = sqlx::query_as::<_, AttributeGroup>(
            r#"
            SELECT id, org_id, name, is_active, created_at, updated_at
            FROM attribute_groups
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

        let mut results = Vec::with_capacity(groups.len());
        for group in groups {
            let attributes = self.group_members(group.id).await?;
            results.push(AttributeGroupWithAttributes { group, attributes });
        }

        Ok(Page::new(count, pages, results))
    }

    pub async fn get_group(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> AppResult<AttributeGroupWithAttributes> {
        let group = sqlx::query_as::<_, AttributeGroup>(
            r#"
            SELECT id, org_id, name, is_active, created_at, updated_at
            FROM attribute_groups
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Attribute group".to_string()))?;

        let attributes = self.group_members(group.id).await?;
        Ok(AttributeGroupWithAttributes { group, attributes })
    }

    pub async fn create_group(
        &self,
        org_id: Uuid,
        input: CreateAttributeGroupInput,
    ) -> AppResult<AttributeGroupWithAttributes> {
        input.validate()?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attribute_groups WHERE org_id = $1 AND name = $2)",
        )
        .bind(org_id)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        self.require_attributes(org_id, &input.attribute_ids).await?;

        let mut tx = self.db.begin().await?;

        let group = sqlx::query_as::<_, AttributeGroup>(
            r#"
            INSERT INTO attribute_groups (org_id, name)
            VALUES ($1, $2)
            RETURNING id, org_id, name, is_active, created_at, updated_at
            "#,
        )
        .bind(org_id)
        .bind(&input.name)
        .fetch_one(&mut *tx)
        .await?;

        for (position, attribute_id) in input.attribute_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO attribute_group_members (group_id, attribute_id, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(group.id)
            .bind(attribute_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let attributes = self.group_members(group.id).await?;
        Ok(AttributeGroupWithAttributes { group, attributes })
    }

    pub async fn update_group(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateAttributeGroupInput,
    ) -> AppResult<AttributeGroupWithAttributes> {
        input.validate()?;
        if let Some(attribute_ids) = &input.attribute_ids {
            self.require_attributes(org_id, attribute_ids).await?;
        }

        let mut tx = self.db.begin().await?;

        let group = sqlx::query_as::<_, AttributeGroup>(
            r#"
            UPDATE attribute_groups
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
        .ok_or_else(|| AppError::NotFound("Attribute group".to_string()))?;

        // Replace the membership when a new set is supplied
        if let Some(attribute_ids) = &input.attribute_ids {
            sqlx::query("DELETE FROM attribute_group_members WHERE group_id = $1")
                .bind(group.id)
                .execute(&mut *tx)
                .await?;

            for (position, attribute_id) in attribute_ids.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO attribute_group_members (group_id, attribute_id, position)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(group.id)
                .bind(attribute_id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        let attributes = self.group_members(group.id).await?;
        Ok(AttributeGroupWithAttributes { group, attributes })
    }

    pub async fn delete_group(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM attribute_group_members WHERE group_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM attribute_groups WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Attribute group".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn group_members(&self, group_id: Uuid) -> AppResult<Vec<Attribute>> {
        let attributes = sqlx::query_as::<_, Attribute>(
            r#"
            SELECT a.id, a.org_id, a.name, a.code, a.data_type, a.is_required,
                   a.is_active, a.created_at, a.updated_at
            FROM attributes a
            JOIN attribute_group_members m ON m.attribute_id = a.id
            WHERE m.group_id = $1
            ORDER BY m.position
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.db)
        .await?;

        Ok(attributes)
    }

    /// Every submitted member id must name an attribute in this
    /// organization, exactly once. Fails before anything is written.
    async fn require_attributes(&self, org_id: Uuid, ids: &[Uuid]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        if let Some(dup) = super::duplicate_member(ids) {
            return Err(AppError::field(
                "attribute_ids",
                format!("Attribute {} is listed more than once", dup),
            ));
        }

        let found = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM attributes WHERE id = ANY($1) AND org_id = $2",
        )
        .bind(ids)
        .bind(org_id)
        .fetch_all(&self.db)
        .await?;

        if let Some(missing) = super::missing_member(ids, &found) {
            return Err(AppError::NotFound(format!("Attribute {}", missing)));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Attribute options
    // ------------------------------------------------------------------

    pub async fn list_options(
        &self,
        org_id: Uuid,
        filter: AttributeOptionFilter,
    ) -> AppResult<Page<AttributeOption>> {
        let pages = PageParams::new(filter.page, filter.page_size);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM attribute_options o
            WHERE o.org_id = $1
              AND ($2::uuid IS NULL OR o.attribute_id = $2)
              AND ($3::boolean IS NULL OR o.is_active = $3)
            "#,
        )
        .bind(org_id)
        .bind(filter.attribute_id)
        .bind(filter.is_active)
        .fetch_one(&self.db)
        .await?;

        let query = format!(
            r#"{OPTION_SELECT}
            WHERE o.org_id = $1
              AND ($2::uuid IS NULL OR o.attribute_id = $2)
              AND ($3::boolean IS NULL OR o.is_active = $3)
            ORDER BY o.sort_order, o.label
            LIMIT $4 OFFSET $5
            "#
        );

        let rows = sqlx::query_as::<_, AttributeOptionRow>(&query)
            .bind(org_id)
            .bind(filter.attribute_id)
            .bind(filter.is_active)
            .bind(pages.limit())
            .bind(pages.offset())
            .fetch_all(&self.db)
            .await?;

        let results = rows.into_iter().map(AttributeOptionRow::into_option).collect();
        Ok(Page::new(count, pages, results))
    }

    pub async fn get_option(&self, org_id: Uuid, id: Uuid) -> AppResult<AttributeOption> {
        let query = format!("{OPTION_SELECT} WHERE o.id = $1 AND o.org_id = $2");

        sqlx::query_as::<_, AttributeOptionRow>(&query)
            .bind(id)
            .bind(org_id)
            .fetch_optional(&self.db)
            .await?
            .map(AttributeOptionRow::into_option)
            .ok_or_else(|| AppError::NotFound("Attribute option".to_string()))
    }

    pub async fn create_option(
        &self,
        org_id: Uuid,
        input: CreateAttributeOptionInput,
    ) -> AppResult<AttributeOption> {
        input.validate()?;

        let attribute_id = input.attribute.id_with(|a| a.id);
        let attribute = self.get_attribute(org_id, attribute_id).await?;

        // Only select attributes carry an option list
        let data_type: AttributeDataType = attribute
            .data_type
            .parse()
            .map_err(|_| AppError::Internal("Corrupt attribute data type".to_string()))?;
        if !data_type.supports_options() {
            return Err(AppError::field(
                "attribute",
                "Options can only be added to select attributes",
            ));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attribute_options WHERE attribute_id = $1 AND value = $2)",
        )
        .bind(attribute_id)
        .bind(&input.value)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("value".to_string()));
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO attribute_options (org_id, attribute_id, label, value, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(org_id)
        .bind(attribute_id)
        .bind(&input.label)
        .bind(&input.value)
        .bind(input.sort_order)
        .fetch_one(&self.db)
        .await?;

        self.get_option(org_id, id).await
    }

    pub async fn update_option(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateAttributeOptionInput,
    ) -> AppResult<AttributeOption> {
        input.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE attribute_options
            SET label = COALESCE($1, label),
                value = COALESCE($2, value),
                sort_order = COALESCE($3, sort_order),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5 AND org_id = $6
            "#,
        )
        .bind(&input.label)
        .bind(&input.value)
        .bind(input.sort_order)
        .bind(input.is_active)
        .bind(id)
        .bind(org_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Attribute option".to_string()));
        }

        self.get_option(org_id, id).await
    }

    pub async fn delete_option(&self, org_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM attribute_options WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Attribute option".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_pool;

    async fn make_attribute(service: &AttributeService, org_id: Uuid, code: &str) -> Attribute {
        service
            .create_attribute(
                org_id,
                CreateAttributeInput {
                    name: format!("Attribute {}", code),
                    code: code.to_string(),
                    data_type: AttributeDataType::Text,
                    is_required: false,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn group_rejects_unknown_member_id() {
        let service = AttributeService::new(test_pool().await);
        let org_id = Uuid::new_v4();

        let err = service
            .create_group(
                org_id,
                CreateAttributeGroupInput {
                    name: "Ghost members".to_string(),
                    attribute_ids: vec![Uuid::new_v4()],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Nothing was written
        let page = service
            .list_groups(org_id, AttributeFilter::default())
            .await
            .unwrap();
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    #[ignore]
    async fn group_rejects_other_org_member_id() {
        let service = AttributeService::new(test_pool().await);
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();

        let foreign = make_attribute(&service, org_a, "COLOR").await;
        let err = service
            .create_group(
                org_b,
                CreateAttributeGroupInput {
                    name: "Cross-tenant".to_string(),
                    attribute_ids: vec![foreign.id],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore]
    async fn group_rejects_duplicate_member_id() {
        let service = AttributeService::new(test_pool().await);
        let org_id = Uuid::new_v4();

        let attr = make_attribute(&service, org_id, "SIZE").await;
        let err = service
            .create_group(
                org_id,
                CreateAttributeGroupInput {
                    name: "Twice".to_string(),
                    attribute_ids: vec![attr.id, attr.id],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    #[ignore]
    async fn group_preserves_member_order() {
        let service = AttributeService::new(test_pool().await);
        let org_id = Uuid::new_v4();

        // Names chosen so alphabetical order differs from submitted order
        let zeta = make_attribute(&service, org_id, "ZETA").await;
        let alpha = make_attribute(&service, org_id, "ALPHA").await;
        let mid = make_attribute(&service, org_id, "MID").await;

        let submitted = vec![mid.id, zeta.id, alpha.id];
        let group = service
            .create_group(
                org_id,
                CreateAttributeGroupInput {
                    name: "Ordered".to_string(),
                    attribute_ids: submitted.clone(),
                },
            )
            .await
            .unwrap();
        let ids: Vec<Uuid> = group.attributes.iter().map(|a| a.id).collect();
        assert_eq!(ids, submitted);

        // Replacement order sticks too
        let reversed: Vec<Uuid> = submitted.iter().rev().copied().collect();
        let group = service
            .update_group(
                org_id,
                group.group.id,
                UpdateAttributeGroupInput {
                    name: None,
                    is_active: None,
                    attribute_ids: Some(reversed.clone()),
                },
            )
            .await
            .unwrap();
        let ids: Vec<Uuid> = group.attributes.iter().map(|a| a.id).collect();
        assert_eq!(ids, reversed);
    }
}
