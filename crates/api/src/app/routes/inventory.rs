use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};

use fruitsupply_core::DocumentId;
use fruitsupply_infra::repository::Stored;
use fruitsupply_inventory::InventoryItem;

use crate::app::dto::{InventoryAddedResponse, MessageResponse, QuantityUpdate};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn add_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<InventoryItem>, JsonRejection>,
) -> Result<Json<InventoryAddedResponse>, ApiError> {
    let Json(item) = body?;
    let inventory_id = services.inventory.add(&item).await?;

    Ok(Json(InventoryAddedResponse {
        message: "Inventory item added successfully",
        inventory_id,
    }))
}

pub async fn get_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Stored<InventoryItem>>, ApiError> {
    let id: DocumentId = id.parse()?;
    Ok(Json(services.inventory.get(id).await?))
}

/// Full replace; `last_updated` is taken from the body as sent.
pub async fn update_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<InventoryItem>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: DocumentId = id.parse()?;
    let Json(item) = body?;
    services.inventory.replace(id, &item).await?;
    Ok(Json(MessageResponse::new("Inventory item updated successfully")))
}

/// Sets `quantity` only; `last_updated` is not touched.
pub async fn update_inventory_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<QuantityUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: DocumentId = id.parse()?;
    let Json(update) = body?;
    services.inventory.set_quantity(id, update.quantity).await?;
    Ok(Json(MessageResponse::new("Inventory quantity updated successfully")))
}

pub async fn delete_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: DocumentId = id.parse()?;
    services.inventory.delete(id).await?;
    Ok(Json(MessageResponse::new("Inventory item deleted successfully")))
}
