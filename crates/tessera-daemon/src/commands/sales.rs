//! Sale and affiliate command handlers.

use std::sync::Arc;

use serde_json::Value;

use tessera_ledger::recorder::SaleRequest;
use tessera_ledger::{affiliate, recorder, report};

use crate::commands::{ledger_error, now};
use crate::events::Event;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Record a sale and credit the referring affiliate.
pub async fn record_sale(state: &Arc<DaemonState>, params: &Value) -> Result {
    let request: SaleRequest = serde_json::from_value(params.clone())
        .map_err(|e| RpcError::invalid_params(&e.to_string()))?;

    let timestamp = now();
    let receipt = {
        let mut db = state.db.lock().await;
        recorder::record_sale(&mut db, &request, timestamp).map_err(|e| ledger_error(&e))?
    };

    state.event_bus.emit(Event {
        event_type: "SaleRecorded".to_string(),
        timestamp,
        payload: serde_json::json!({
            "sale_id": receipt.sale_id,
            "commission_amount": receipt.commission_amount,
            "affiliate_credited": receipt.affiliate_credited,
        }),
    });

    serde_json::to_value(&receipt).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Enroll a user as an affiliate, issuing a referral code.
pub async fn enroll_affiliate(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;

    let db = state.db.lock().await;
    let enrolled = affiliate::enroll(&db, user_id, now()).map_err(|e| ledger_error(&e))?;

    serde_json::to_value(&enrolled).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Per-affiliate commission statement.
pub async fn affiliate_report(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;

    let db = state.db.lock().await;
    let report = report::affiliate_report(&db, user_id).map_err(|e| ledger_error(&e))?;

    serde_json::to_value(&report).map_err(|e| RpcError::internal_error(&e.to_string()))
}
