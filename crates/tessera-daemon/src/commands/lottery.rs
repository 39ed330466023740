//! Lottery command handlers.

use std::sync::Arc;

use serde_json::Value;

use tessera_lottery::{recorder, threshold};
use tessera_types::lottery::PrizeTier;

use crate::commands::{lottery_error, now};
use crate::events::Event;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Check whether aggregate revenue has reached a threshold. Falls back to
/// the configured default threshold when none is supplied.
pub async fn check_threshold(state: &Arc<DaemonState>, params: &Value) -> Result {
    let revenue_threshold = params
        .get("revenue_threshold")
        .and_then(|v| v.as_u64())
        .unwrap_or(state.config.lottery.default_revenue_threshold);

    let db = state.db.lock().await;
    let status = threshold::check(&db, revenue_threshold).map_err(|e| lottery_error(&e))?;

    match status {
        threshold::ThresholdStatus::Reached { entries } => Ok(serde_json::json!({
            "threshold_reached": true,
            "total_entries": entries.len(),
            "entries": entries,
        })),
        threshold::ThresholdStatus::NotReached { current_revenue } => Ok(serde_json::json!({
            "threshold_reached": false,
            "current_revenue": current_revenue,
        })),
    }
}

/// Execute a drawing for the given prize tiers.
pub async fn execute_draw(state: &Arc<DaemonState>, params: &Value) -> Result {
    let tiers: Vec<PrizeTier> = params
        .get("prize_tiers")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| RpcError::invalid_params(&e.to_string()))?
        .ok_or_else(|| RpcError::invalid_params("prize_tiers required"))?;

    let timestamp = now();
    let drawing = {
        let mut db = state.db.lock().await;
        recorder::execute_draw(&mut db, &tiers, timestamp).map_err(|e| lottery_error(&e))?
    };

    state.event_bus.emit(Event {
        event_type: "DrawingCompleted".to_string(),
        timestamp,
        payload: serde_json::json!({
            "drawing_id": drawing.drawing_id,
            "winners_count": drawing.winners.len(),
        }),
    });

    Ok(serde_json::json!({
        "drawing_id": drawing.drawing_id,
        "winners_count": drawing.winners.len(),
        "winners": drawing.winners,
    }))
}

/// All drawings' winners joined with contact info.
pub async fn get_winners(state: &Arc<DaemonState>) -> Result {
    let db = state.db.lock().await;
    let winners = recorder::winners(&db).map_err(|e| lottery_error(&e))?;
    serde_json::to_value(&winners).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Payout-collaborator hook: mark a winner paid.
pub async fn mark_winner_paid(state: &Arc<DaemonState>, params: &Value) -> Result {
    let winner_id = params
        .get("winner_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("winner_id required"))?;

    let db = state.db.lock().await;
    recorder::mark_winner_paid(&db, winner_id).map_err(|e| lottery_error(&e))?;

    Ok(serde_json::json!({"winner_id": winner_id, "status": "paid"}))
}
