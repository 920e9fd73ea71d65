use crate::core::{accounts::Role, schema};
use crate::errors::Result;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};
use serde_json::{Value, json};

async fn handle_health(state: &AppState) -> Result<Value> {
    let sheets: Vec<String> = state
        .workbook
        .worksheets()
        .await?
        .iter()
        .map(|sheet| sheet.title().to_string())
        .collect();
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "workbook": state.workbook.name(),
        "sheets": sheets,
    }))
}

async fn handle_schema_ensure(state: &AppState, req: &Request) -> Result<Value> {
    state.session(req)?.require_role(&[Role::Admin])?;
    let report = schema::ensure_schema(&state.workbook, &state.config).await?;
    let tables: Vec<Value> = report
        .into_iter()
        .map(|(title, status)| json!({ "title": title, "status": status }))
        .collect();
    Ok(json!({ "tables": tables }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "health" => handle_health(state).await,
        "schema.ensure" => handle_schema_ensure(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
