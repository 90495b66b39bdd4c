use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub mod fruits;
pub mod inventory;
pub mod orders;
pub mod system;
pub mod tasks;

/// Flat route table; one verb/path per store operation.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::welcome))
        .route("/health", get(system::health))
        // fruits (keyed by name)
        .route("/add_fruit", post(fruits::add_fruit))
        .route("/get_fruit/:name", get(fruits::get_fruit))
        .route("/update_fruit_price/:name", put(fruits::update_fruit_price))
        .route("/update_fruit/:name", put(fruits::update_fruit))
        .route("/delete_fruit/:name", delete(fruits::delete_fruit))
        // orders
        .route("/place_order", post(orders::place_order))
        .route("/get_order/:id", get(orders::get_order))
        .route("/update_order/:id", put(orders::update_order))
        .route("/delete_order/:id", delete(orders::delete_order))
        // inventory
        .route("/add_inventory", post(inventory::add_inventory))
        .route("/get_inventory/:id", get(inventory::get_inventory))
        .route("/update_inventory/:id", put(inventory::update_inventory))
        .route(
            "/update_inventory_quantity/:id",
            put(inventory::update_inventory_quantity),
        )
        .route("/delete_inventory/:id", delete(inventory::delete_inventory))
        // tasks
        .route("/reset_inventory/:id", post(tasks::reset_inventory))
        .route("/task_status/:task_id", get(tasks::task_status))
}
