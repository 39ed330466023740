//! External-collaborator hooks on the users table.
//!
//! Registration and loyalty awarding belong to out-of-scope collaborators;
//! these handlers are the write surface those collaborators call.

use std::sync::Arc;

use serde_json::Value;

use tessera_db::queries::users;
use tessera_db::DbError;

use crate::commands::now;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

fn db_error(err: &DbError) -> RpcError {
    match err {
        DbError::NotFound(what) => RpcError::not_found(what),
        DbError::Constraint(detail) => RpcError::conflict(detail),
        other => RpcError::internal_error(&format!("db error: {other}")),
    }
}

/// Register a user row.
pub async fn register(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;
    if user_id.is_empty() {
        return Err(RpcError::invalid_params("user_id is empty"));
    }
    let bot_handle = params.get("bot_handle").and_then(|v| v.as_str());

    let db = state.db.lock().await;
    users::insert(&db, user_id, bot_handle, now()).map_err(|e| db_error(&e))?;

    Ok(serde_json::json!({"user_id": user_id}))
}

/// Award loyalty points to a user (atomic increment).
pub async fn award_points(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;
    let points = params
        .get("points")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("points required"))?;
    if points == 0 {
        return Err(RpcError::invalid_params("points must be positive"));
    }

    let db = state.db.lock().await;
    users::award_points(&db, user_id, points).map_err(|e| db_error(&e))?;
    let user = users::get(&db, user_id).map_err(|e| db_error(&e))?;

    Ok(serde_json::json!({"user_id": user_id, "points": user.points}))
}
