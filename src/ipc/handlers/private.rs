use crate::core::accounts::Role;
use crate::core::notes::{add_entry, ensure_private_sheet, read_private_log};
use crate::errors::Result;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Deserialize)]
struct CodeParams {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Deserialize)]
struct EntryParams {
    code: String,
    topic: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    link: Option<String>,
}

async fn handle_ensure(state: &AppState, req: &Request) -> Result<Value> {
    let session = state.session(req)?;
    let params: CodeParams = req.params()?;
    // Any account may recreate its own sheet
    let code = session.target_code(params.code.as_deref(), &[Role::Admin])?;
    let conn = state.workbook.connection();
    let (_, created) = ensure_private_sheet(conn, &state.config, &code).await?;
    Ok(json!({ "code": code, "created": created }))
}

async fn handle_add(state: &AppState, req: &Request) -> Result<Value> {
    state
        .session(req)?
        .require_role(&[Role::Admin, Role::Teacher])?;
    let params: EntryParams = req.params()?;
    let row = add_entry(
        state.workbook.connection(),
        &state.config,
        params.code.trim(),
        &params.topic,
        &params.notes,
        params.link.as_deref(),
    )
    .await?;
    Ok(json!({ "code": params.code.trim(), "row": row }))
}

async fn handle_read(state: &AppState, req: &Request) -> Result<Value> {
    let session = state.session(req)?;
    let params: CodeParams = req.params()?;
    let code = session.target_code(params.code.as_deref(), &[Role::Admin])?;
    let log = read_private_log(state.workbook.connection(), &state.config, &code).await?;
    Ok(json!({ "log": log }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "private.ensure" => handle_ensure(state, req).await,
        "private.add" => handle_add(state, req).await,
        "private.read" => handle_read(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
