use crate::core::accounts::{Role, verify_login};
use crate::errors::Result;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

#[derive(Deserialize)]
struct LoginParams {
    role: Role,
    code: String,
    password: String,
}

async fn handle_login(state: &mut AppState, req: &Request) -> Result<Value> {
    let params: LoginParams = req.params()?;
    let account = verify_login(
        &state.workbook,
        &state.config,
        params.role,
        &params.code,
        &params.password,
    )
    .await?;

    let session = state.open_session(&account);
    info!("{} {} logged in", session.role, session.code);
    Ok(json!({
        "session": session.token,
        "role": session.role,
        "code": session.code,
        "name": session.name,
        "account": account,
    }))
}

fn handle_logout(state: &mut AppState, req: &Request) -> Result<Value> {
    let session = state.session(req)?;
    let closed = state.close_session(&session.token);
    info!("{} {} logged out", session.role, session.code);
    Ok(json!({ "loggedOut": closed }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "auth.login" => handle_login(state, req).await,
        "auth.logout" => handle_logout(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
