use crate::core::accounts::Role;
use crate::core::payments::{FeeKind, record_payment};
use crate::errors::Result;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Deserialize)]
struct PaymentParams {
    code: String,
    kind: FeeKind,
    amount: i64,
}

async fn handle_record(state: &AppState, req: &Request) -> Result<Value> {
    state.session(req)?.require_role(&[Role::Admin])?;
    let params: PaymentParams = req.params()?;
    let receipt = record_payment(
        &state.workbook,
        &state.config,
        &params.code,
        params.kind,
        params.amount,
    )
    .await?;
    Ok(json!({ "receipt": receipt }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "payments.record" => handle_record(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
