use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};
use tracing::info;

use fruitsupply_core::{DocumentId, TaskId};
use fruitsupply_infra::tasks::TaskStatus;

use crate::app::dto::{QuantityUpdate, TaskQueuedResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// Queue a reset; the item is not looked up first, so an unknown id still
/// yields a task (which then succeeds without changing anything).
pub async fn reset_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<QuantityUpdate>, JsonRejection>,
) -> Result<Json<TaskQueuedResponse>, ApiError> {
    let id: DocumentId = id.parse()?;
    let Json(QuantityUpdate { quantity }) = body?;

    let task_id = services.queue_inventory_reset(id, quantity).await?;
    info!(task_id = %task_id, inventory_id = %id, quantity, "inventory reset queued");

    Ok(Json(TaskQueuedResponse {
        message: "Inventory reset task queued",
        task_id,
    }))
}

pub async fn task_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatus>, ApiError> {
    let task_id: TaskId = task_id.parse()?;
    Ok(Json(services.queue.status(task_id).await?))
}
