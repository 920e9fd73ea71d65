use crate::core::accounts::{self, NewTeacher, Role};
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

async fn handle_register(state: &AppState, req: &Request) -> Result<Value> {
    state.session(req)?.require_role(&[Role::Admin])?;
    let new: NewTeacher = req.params()?;
    let registration = accounts::register_teacher(&state.workbook, &state.config, new).await?;
    Ok(json!({
        "teacher": registration.account,
        "password": registration.password,
    }))
}

async fn handle_get(state: &AppState, req: &Request) -> Result<Value> {
    let session = state.session(req)?;
    session.require_role(&[Role::Admin, Role::Teacher])?;
    let params: CodeParams = req.params()?;
    let code = session.target_code(params.code.as_deref(), &[Role::Admin])?;
    let teacher = accounts::get_teacher(state.workbook.connection(), &state.config, &code).await?;
    Ok(json!({ "teacher": teacher }))
}

async fn handle_list(state: &AppState, req: &Request) -> Result<Value> {
    state.session(req)?.require_role(&[Role::Admin])?;
    let teachers = accounts::list_teachers(state.workbook.connection(), &state.config).await?;
    Ok(json!({ "teachers": teachers }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "teachers.register" => handle_register(state, req).await,
        "teachers.get" => handle_get(state, req).await,
        "teachers.list" => handle_list(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
