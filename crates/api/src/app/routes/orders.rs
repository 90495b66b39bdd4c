use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};

use fruitsupply_core::DocumentId;
use fruitsupply_infra::repository::Stored;
use fruitsupply_sales::Order;

use crate::app::dto::{MessageResponse, OrderPlacedResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Order>, JsonRejection>,
) -> Result<Json<OrderPlacedResponse>, ApiError> {
    let Json(order) = body?;
    let order_id = services.orders.place(&order).await?;

    Ok(Json(OrderPlacedResponse {
        message: "Order placed successfully",
        order_id,
    }))
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Stored<Order>>, ApiError> {
    let id: DocumentId = id.parse()?;
    Ok(Json(services.orders.get(id).await?))
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<Order>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: DocumentId = id.parse()?;
    let Json(order) = body?;
    services.orders.replace(id, &order).await?;
    Ok(Json(MessageResponse::new("Order updated successfully")))
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: DocumentId = id.parse()?;
    services.orders.delete(id).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}
