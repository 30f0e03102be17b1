//! Route definitions for the production workflow API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth routes (register/login public, profile protected)
        .nest("/auth", auth_routes())
        // Protected routes - production order pipeline
        .nest("/production-orders", order_routes())
        .nest("/recipes", recipe_routes())
        .nest("/prod-journal", journal_routes())
        .nest("/prod-qa", lab_routes())
        .nest("/shipments", shipment_routes())
        .nest("/shipment-reports", shipment_report_routes())
        // Protected routes - procurement
        .nest("/purchases", purchase_routes())
        .nest("/categories", category_routes())
        .nest("/clients", client_routes())
        .nest("/suppliers", supplier_routes())
        // Protected routes - reference data
        .nest("/references", reference_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route(
            "/me",
            get(handlers::me).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Production order routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route(
            "/:order_id",
            get(handlers::get_order)
                .put(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route("/:order_id/actions", post(handlers::apply_order_action))
        .route("/:order_id/permitted-actions", get(handlers::get_permitted_actions))
        .route("/:order_id/recipe", get(handlers::get_order_recipe))
        .route("/:order_id/journal", get(handlers::list_order_journal))
        .route("/:order_id/qa", get(handlers::list_order_qa))
        .route("/:order_id/shipments", get(handlers::list_order_shipments))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Recipe routes (protected)
fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_recipe))
        .route(
            "/:recipe_id",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Production journal routes (protected)
fn journal_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_journal_entry))
        .route(
            "/:entry_id",
            get(handlers::get_journal_entry).put(handlers::update_journal_entry),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Quality-control routes (protected)
fn lab_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_lab_report))
        .route(
            "/:report_id",
            get(handlers::get_lab_report).put(handlers::update_lab_report),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Shipment routes (protected)
fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_shipments).post(handlers::create_shipment))
        .route("/:shipment_id", get(handlers::get_shipment))
        .route("/:shipment_id/load", put(handlers::load_shipment))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Shipment report routes (protected)
fn shipment_report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_shipment_reports).post(handlers::create_shipment_report),
        )
        .route(
            "/:report_id",
            get(handlers::get_shipment_report).put(handlers::update_shipment_report),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase routes (protected)
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_purchases).post(handlers::create_purchase))
        .route(
            "/:purchase_id",
            get(handlers::get_purchase)
                .put(handlers::update_purchase)
                .delete(handlers::delete_purchase),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Category routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route("/tree", get(handlers::get_category_tree))
        .route(
            "/:category_id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route("/:category_id/parent-options", get(handlers::get_parent_options))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Client routes (protected)
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_clients).post(handlers::create_client))
        .route(
            "/:client_id",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Flat reference-table routes (protected)
fn reference_routes() -> Router<AppState> {
    Router::new()
        .route("/marks", get(handlers::list_marks).post(handlers::create_mark))
        .route(
            "/unit-types",
            get(handlers::list_unit_types).post(handlers::create_unit_type),
        )
        .route(
            "/bag-types",
            get(handlers::list_bag_types).post(handlers::create_bag_type),
        )
        .route(
            "/currencies",
            get(handlers::list_currencies).post(handlers::create_currency),
        )
        .route(
            "/countries",
            get(handlers::list_countries).post(handlers::create_country),
        )
        .route("/cities", get(handlers::list_cities).post(handlers::create_city))
        .route_layer(middleware::from_fn(auth_middleware))
}
