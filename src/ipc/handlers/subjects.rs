use crate::core::accounts::Role;
use crate::core::subjects::{NewAssignment, SubjectFilter, assign_subject, list_subjects};
use crate::errors::Result;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};
use serde_json::{Value, json};

async fn handle_assign(state: &AppState, req: &Request) -> Result<Value> {
    state.session(req)?.require_role(&[Role::Admin])?;
    let new: NewAssignment = req.params()?;
    let assignment = assign_subject(&state.workbook, &state.config, new).await?;
    Ok(json!({ "assignment": assignment }))
}

/// Any logged-in account may browse assignments.
async fn handle_list(state: &AppState, req: &Request) -> Result<Value> {
    state.session(req)?;
    let filter: SubjectFilter = req.params()?;
    let subjects = list_subjects(state.workbook.connection(), &state.config, &filter).await?;
    Ok(json!({ "subjects": subjects }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "subjects.assign" => handle_assign(state, req).await,
        "subjects.list" => handle_list(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
