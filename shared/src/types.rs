//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of results per page
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// Hard cap on requested page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: u32,
    page_size: u32,
}

impl PageParams {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of list results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: i64, params: PageParams, results: Vec<T>) -> Self {
        Self {
            count,
            page: params.page(),
            page_size: params.page_size(),
            results,
        }
    }
}

/// A relation that is accepted as a bare id on write and returned resolved
/// on read. Resolution happens once at the data-access boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<T> {
    Resolved(T),
    Id(Uuid),
}

impl<T> Related<T> {
    /// Extract the target id, given a way to read it off a resolved value
    pub fn id_with(&self, f: impl FnOnce(&T) -> Uuid) -> Uuid {
        match self {
            Related::Id(id) => *id,
            Related::Resolved(value) => f(value),
        }
    }

    pub fn as_resolved(&self) -> Option<&T> {
        match self {
            Related::Resolved(value) => Some(value),
            Related::Id(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Thing {
        id: Uuid,
        name: String,
    }

    #[test]
    fn page_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn page_size_is_capped() {
        let params = PageParams::new(Some(3), Some(500));
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 200);
    }

    #[test]
    fn zero_page_is_normalized() {
        let params = PageParams::new(Some(0), Some(0));
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 1);
    }

    #[test]
    fn related_deserializes_from_bare_id() {
        let id = Uuid::new_v4();
        let related: Related<Thing> = serde_json::from_value(serde_json::json!(id)).unwrap();
        assert_eq!(related, Related::Id(id));
        assert_eq!(related.id_with(|t| t.id), id);
    }

    #[test]
    fn related_deserializes_from_object() {
        let id = Uuid::new_v4();
        let related: Related<Thing> = serde_json::from_value(serde_json::json!({
            "id": id,
            "name": "Blue",
        }))
        .unwrap();
        assert_eq!(related.as_resolved().map(|t| t.name.as_str()), Some("Blue"));
        assert_eq!(related.id_with(|t| t.id), id);
    }
}
