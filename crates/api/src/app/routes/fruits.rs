use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};

use fruitsupply_catalog::Fruit;
use fruitsupply_infra::repository::Stored;

use crate::app::dto::{FruitAddedResponse, FruitPriceUpdate, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn add_fruit(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Fruit>, JsonRejection>,
) -> Result<Json<FruitAddedResponse>, ApiError> {
    let Json(fruit) = body?;
    let fruit_id = services.fruits.add(&fruit).await?;

    Ok(Json(FruitAddedResponse {
        message: "Fruit added successfully",
        fruit_id,
    }))
}

pub async fn get_fruit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> Result<Json<Stored<Fruit>>, ApiError> {
    Ok(Json(services.fruits.get(&name).await?))
}

pub async fn update_fruit_price(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    body: Result<Json<FruitPriceUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(update) = body?;
    services.fruits.update_price(&name, update.price).await?;
    Ok(Json(MessageResponse::new("Fruit price updated successfully")))
}

pub async fn update_fruit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    body: Result<Json<Fruit>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(fruit) = body?;
    services.fruits.replace(&name, &fruit).await?;
    Ok(Json(MessageResponse::new("Fruit updated successfully")))
}

pub async fn delete_fruit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    services.fruits.delete(&name).await?;
    Ok(Json(MessageResponse::new("Fruit deleted successfully")))
}
