//! Route definitions for the Commerce Master Data Platform

use axum::{middleware, routing::get, Router};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - catalogue master data
        .nest("/catalogue", catalogue_routes())
        // Protected routes - product attributes
        .nest("/attributes", attribute_routes())
        // Protected routes - tax configuration
        .nest("/pricing", pricing_routes())
        // Protected routes - customer master data
        .nest("/crm", crm_routes())
        // Protected routes - stock tracking
        .nest("/inventory", inventory_routes())
}

/// Catalogue routes (protected)
fn catalogue_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/divisions",
            get(handlers::list_divisions).post(handlers::create_division),
        )
        .route(
            "/divisions/:id",
            get(handlers::get_division)
                .put(handlers::update_division)
                .delete(handlers::delete_division),
        )
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/subcategories",
            get(handlers::list_subcategories).post(handlers::create_subcategory),
        )
        .route(
            "/subcategories/:id",
            get(handlers::get_subcategory)
                .put(handlers::update_subcategory)
                .delete(handlers::delete_subcategory),
        )
        .route(
            "/units",
            get(handlers::list_units).post(handlers::create_unit),
        )
        .route(
            "/units/:id",
            get(handlers::get_unit)
                .put(handlers::update_unit)
                .delete(handlers::delete_unit),
        )
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Attribute dictionary routes (protected)
fn attribute_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_attributes).post(handlers::create_attribute),
        )
        .route(
            "/groups",
            get(handlers::list_attribute_groups).post(handlers::create_attribute_group),
        )
        .route(
            "/groups/:id",
            get(handlers::get_attribute_group)
                .put(handlers::update_attribute_group)
                .delete(handlers::delete_attribute_group),
        )
        .route(
            "/options",
            get(handlers::list_attribute_options).post(handlers::create_attribute_option),
        )
        .route(
            "/options/:id",
            get(handlers::get_attribute_option)
                .put(handlers::update_attribute_option)
                .delete(handlers::delete_attribute_option),
        )
        .route(
            "/:id",
            get(handlers::get_attribute)
                .put(handlers::update_attribute)
                .delete(handlers::delete_attribute),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Tax configuration routes (protected)
fn pricing_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tax-regions",
            get(handlers::list_tax_regions).post(handlers::create_tax_region),
        )
        .route(
            "/tax-regions/:id",
            get(handlers::get_tax_region)
                .put(handlers::update_tax_region)
                .delete(handlers::delete_tax_region),
        )
        .route(
            "/tax-rates",
            get(handlers::list_tax_rates).post(handlers::create_tax_rate),
        )
        .route(
            "/tax-rates/:id",
            get(handlers::get_tax_rate)
                .put(handlers::update_tax_rate)
                .delete(handlers::delete_tax_rate),
        )
        .route(
            "/tax-rate-profiles",
            get(handlers::list_tax_rate_profiles).post(handlers::create_tax_rate_profile),
        )
        .route(
            "/tax-rate-profiles/:id",
            get(handlers::get_tax_rate_profile)
                .put(handlers::update_tax_rate_profile)
                .delete(handlers::delete_tax_rate_profile),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer master-data routes (protected)
fn crm_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/customer-groups",
            get(handlers::list_customer_groups).post(handlers::create_customer_group),
        )
        .route(
            "/customer-groups/:id",
            get(handlers::get_customer_group)
                .put(handlers::update_customer_group)
                .delete(handlers::delete_customer_group),
        )
        .route(
            "/channels",
            get(handlers::list_channels).post(handlers::create_channel),
        )
        .route(
            "/channels/:id",
            get(handlers::get_channel)
                .put(handlers::update_channel)
                .delete(handlers::delete_channel),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        // Locations and reasons
        .route(
            "/locations",
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route(
            "/locations/:id",
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
        .route(
            "/reasons",
            get(handlers::list_reasons).post(handlers::create_reason),
        )
        .route(
            "/reasons/:id",
            get(handlers::get_reason)
                .put(handlers::update_reason)
                .delete(handlers::delete_reason),
        )
        // Stock levels
        .route(
            "/levels",
            get(handlers::list_stock_levels).post(handlers::create_stock_level),
        )
        .route(
            "/levels/:id",
            get(handlers::get_stock_level)
                .put(handlers::update_stock_level)
                .delete(handlers::delete_stock_level),
        )
        .route(
            "/levels/:id/adjustments",
            get(handlers::get_stock_level_adjustments),
        )
        .route("/levels/:id/lots", get(handlers::get_stock_level_lots))
        // Adjustments
        .route(
            "/adjustments",
            get(handlers::list_adjustments).post(handlers::create_adjustment),
        )
        .route("/adjustments/:id", get(handlers::get_adjustment))
        .route("/adjustment-types", get(handlers::list_adjustment_types))
        // Lots
        .route("/lots", get(handlers::list_lots).post(handlers::create_lot))
        .route(
            "/lots/:id",
            get(handlers::get_lot)
                .put(handlers::update_lot)
                .delete(handlers::delete_lot),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
