//! `inventory.reset_quantity`: overwrite one inventory item's quantity.
//!
//! Arguments: `[inventory_id: string, quantity: non-negative integer]`.
//! An id that names no item is not an error; the task succeeds having
//! changed nothing.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use fruitsupply_core::DocumentId;

use super::types::{TaskError, TaskMessage};
use super::worker::TaskRegistry;
use crate::document_store::StoreError;
use crate::repository::InventoryRepository;

pub const RESET_INVENTORY_TASK: &str = "inventory.reset_quantity";

/// Value a successful run returns.
pub const RESET_ACK: &str = "Reset inventory data";

/// Build the message that resets `inventory_id` to `quantity`.
pub fn reset_inventory_message(inventory_id: &str, quantity: u64) -> TaskMessage {
    TaskMessage::new(RESET_INVENTORY_TASK, vec![json!(inventory_id), json!(quantity)])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResetArgs {
    inventory_id: DocumentId,
    quantity: u64,
}

fn parse_args(args: &[JsonValue]) -> Result<ResetArgs, TaskError> {
    let [id, quantity] = args else {
        return Err(TaskError::InvalidArguments(format!(
            "expected [inventory_id, quantity], got {} argument(s)",
            args.len()
        )));
    };

    let id = id
        .as_str()
        .ok_or_else(|| TaskError::InvalidArguments(format!("inventory_id must be a string, got {id}")))?;
    let inventory_id = id
        .parse::<DocumentId>()
        .map_err(|e| TaskError::InvalidArguments(e.to_string()))?;
    let quantity = quantity.as_u64().ok_or_else(|| {
        TaskError::InvalidArguments(format!("quantity must be a non-negative integer, got {quantity}"))
    })?;

    Ok(ResetArgs {
        inventory_id,
        quantity,
    })
}

/// Run the task against `repo`.
pub async fn run(repo: &InventoryRepository, args: &[JsonValue]) -> Result<JsonValue, TaskError> {
    let ResetArgs {
        inventory_id,
        quantity,
    } = parse_args(args)?;

    match repo.set_quantity(inventory_id, quantity).await {
        Ok(()) => {
            info!(inventory_id = %inventory_id, quantity, "inventory quantity reset");
        }
        Err(StoreError::NotFound(what)) => {
            debug!(inventory_id = %inventory_id, "{what}; nothing to reset");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(json!(RESET_ACK))
}

/// Register the task under [`RESET_INVENTORY_TASK`].
pub fn register(registry: &mut TaskRegistry, repo: InventoryRepository) {
    let repo = Arc::new(repo);
    registry.register(RESET_INVENTORY_TASK, move |args| {
        let repo = repo.clone();
        Box::pin(async move { run(&repo, &args).await })
    });
}
