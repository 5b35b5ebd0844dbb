//! Business logic services for the Commerce Master Data Platform

use uuid::Uuid;

pub mod attributes;
pub mod catalogue;
pub mod crm;
pub mod inventory;
pub mod lot;
pub mod pricing;

pub use attributes::AttributeService;
pub use catalogue::CatalogueService;
pub use crm::CrmService;
pub use inventory::InventoryService;
pub use lot::LotService;
pub use pricing::PricingService;

/// First requested member id absent from the fetched set, if any.
/// Member lists are small; linear scans are fine.
pub(crate) fn missing_member(requested: &[Uuid], found: &[Uuid]) -> Option<Uuid> {
    requested.iter().copied().find(|id| !found.contains(id))
}

/// First id submitted more than once, if any.
pub(crate) fn duplicate_member(ids: &[Uuid]) -> Option<Uuid> {
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Some(*id);
        }
    }
    None
}

/// Pool for the database-backed tests below each service. Those tests are
/// `#[ignore]`d; run them against a disposable Postgres with
/// `DATABASE_URL=... cargo test -- --ignored`.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_member_reports_first_unknown_id() {
        let known = vec![Uuid::new_v4(), Uuid::new_v4()];
        let unknown = Uuid::new_v4();

        assert_eq!(missing_member(&known, &known), None);
        assert_eq!(
            missing_member(&[known[0], unknown, known[1]], &known),
            Some(unknown)
        );
        assert_eq!(missing_member(&[], &known), None);
        assert_eq!(missing_member(&[unknown], &[]), Some(unknown));
    }

    #[test]
    fn duplicate_member_reports_first_repeat() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(duplicate_member(&[a, b]), None);
        assert_eq!(duplicate_member(&[a, b, a]), Some(a));
        assert_eq!(duplicate_member(&[]), None);
    }
}
