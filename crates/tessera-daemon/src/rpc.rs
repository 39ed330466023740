//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! newline-delimited JSON-RPC 2.0 method calls to the command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::events::Event;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// Error code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602). Also carries validation failures.
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603). Persistence failures surface here and are
    /// retryable by the caller.
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Referenced record not found (-32004).
    pub fn not_found(what: &str) -> Self {
        Self {
            code: -32004,
            message: "NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"what": what})),
        }
    }

    /// Duplicate identifier or illegal transition (-32009).
    pub fn conflict(detail: &str) -> Self {
        Self {
            code: -32009,
            message: "CONFLICT".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// A draw was requested against an empty entry pool (-32020).
    pub fn empty_entry_pool(requested: u32) -> Self {
        Self {
            code: -32020,
            message: "EMPTY_ENTRY_POOL".to_string(),
            data: Some(serde_json::json!({"requested": requested})),
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// JSON-RPC notification pushed to a subscribed connection.
#[derive(Debug, Serialize)]
struct RpcNotification {
    jsonrpc: String,
    method: String,
    params: Event,
}

/// Handle a single client connection.
///
/// Besides request/response traffic, a connection may subscribe to daemon
/// events; emitted events are then pushed to it as JSON-RPC notifications
/// interleaved with responses.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    // Set while this connection holds an event subscription
    let mut events: Option<broadcast::Receiver<Event>> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break; // EOF
                };

                let response = match serde_json::from_str::<RpcRequest>(&line) {
                    // Subscription is per-connection state, handled here
                    // rather than in the dispatch table.
                    Ok(request) if request.method == "subscribe_events" => {
                        events = Some(state.event_bus.subscribe());
                        RpcResponse::success(request.id, serde_json::json!({"subscribed": true}))
                    }
                    Ok(request) if request.method == "unsubscribe_events" => {
                        events = None;
                        RpcResponse::success(request.id, serde_json::json!({"subscribed": false}))
                    }
                    Ok(request) => dispatch_request(state.clone(), request).await,
                    Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
                };

                let mut response_json = serde_json::to_string(&response)?;
                response_json.push('\n');
                writer.write_all(response_json.as_bytes()).await?;
                writer.flush().await?;
            }
            event = next_event(&mut events), if events.is_some() => {
                match event {
                    Some(Ok(event)) => {
                        let notification = RpcNotification {
                            jsonrpc: "2.0".to_string(),
                            method: "event".to_string(),
                            params: event,
                        };
                        let mut json = serde_json::to_string(&notification)?;
                        json.push('\n');
                        writer.write_all(json.as_bytes()).await?;
                        writer.flush().await?;
                    }
                    Some(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                        warn!("Event subscriber lagged, {skipped} events dropped");
                    }
                    Some(Err(broadcast::error::RecvError::Closed)) | None => {
                        events = None;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Await the next event on an active subscription.
async fn next_event(
    events: &mut Option<broadcast::Receiver<Event>>,
) -> Option<std::result::Result<Event, broadcast::error::RecvError>> {
    match events {
        Some(rx) => Some(rx.recv().await),
        None => None,
    }
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
async fn dispatch_request(state: Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();
    let params = &request.params;

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Sales & affiliates
        "record_sale" => commands::sales::record_sale(&state, params).await,
        "enroll_affiliate" => commands::sales::enroll_affiliate(&state, params).await,
        "get_affiliate_report" => commands::sales::affiliate_report(&state, params).await,

        // Lottery
        "check_threshold" => commands::lottery::check_threshold(&state, params).await,
        "execute_draw" => commands::lottery::execute_draw(&state, params).await,
        "get_winners" => commands::lottery::get_winners(&state).await,
        "mark_winner_paid" => commands::lottery::mark_winner_paid(&state, params).await,

        // External-collaborator hooks on users
        "register_user" => commands::users::register(&state, params).await,
        "award_points" => commands::users::award_points(&state, params).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(error) => RpcResponse::error(id, error),
    }
}
