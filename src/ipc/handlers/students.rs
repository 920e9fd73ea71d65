use crate::core::accounts::{self, NewStudent, Role};
use crate::core::payments;
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

/// Open to everyone: students sign themselves up.
async fn handle_register(state: &AppState, req: &Request) -> Result<Value> {
    let new: NewStudent = req.params()?;
    let registration = accounts::register_student(&state.workbook, &state.config, new).await?;
    Ok(json!({
        "student": registration.account,
        "password": registration.password,
    }))
}

async fn handle_get(state: &AppState, req: &Request) -> Result<Value> {
    let session = state.session(req)?;
    let params: CodeParams = req.params()?;
    let code = session.target_code(params.code.as_deref(), &[Role::Admin, Role::Teacher])?;
    let student = accounts::get_student(state.workbook.connection(), &state.config, &code).await?;
    Ok(json!({ "student": student }))
}

async fn handle_list(state: &AppState, req: &Request) -> Result<Value> {
    state.session(req)?.require_role(&[Role::Admin])?;
    let students = accounts::list_students(state.workbook.connection(), &state.config).await?;
    Ok(json!({ "students": students }))
}

async fn handle_fees(state: &AppState, req: &Request) -> Result<Value> {
    let session = state.session(req)?;
    session.require_role(&[Role::Admin, Role::Student])?;
    let params: CodeParams = req.params()?;
    let code = session.target_code(params.code.as_deref(), &[Role::Admin])?;
    let summary =
        payments::fee_summary_for(state.workbook.connection(), &state.config, &code).await?;
    Ok(json!({ "code": code, "fees": summary }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "students.register" => handle_register(state, req).await,
        "students.get" => handle_get(state, req).await,
        "students.list" => handle_list(state, req).await,
        "students.fees" => handle_fees(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
