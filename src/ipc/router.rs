use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;
use tracing::debug;

/// Dispatches one request to the handler owning its method.
pub async fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    debug!("Handling {} ({})", req.method, req.id);

    if let Some(resp) = handlers::core::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = handlers::auth::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = handlers::students::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = handlers::teachers::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = handlers::payments::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = handlers::subjects::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = handlers::private::try_handle(state, &req).await {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
    )
}
