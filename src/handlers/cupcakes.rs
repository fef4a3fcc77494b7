//! Cupcake API handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::model::FieldInput;
use crate::response::{success_many, success_one, Outcome};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

/// Path ids must be all ASCII digits, so signs and whitespace are rejected too.
fn parse_id(id_str: &str) -> Option<i32> {
    if id_str.is_empty() || !id_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id_str.parse().ok()
}

fn body_to_input(body: Result<Json<Value>, JsonRejection>) -> Result<FieldInput, AppError> {
    let Json(value) = body.map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge("Request body is too large.".into()),
        _ => AppError::BadRequest(e.body_text()),
    })?;
    match value {
        Value::Object(m) => Ok(FieldInput::from_body(&m)),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cupcakes = state.cupcakes.list().await?;
    Ok(success_many(cupcakes))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)
        .ok_or_else(|| AppError::MalformedIdentity(format!("Cupcake id='{}' was not an integer.", id_str)))?;
    let cupcake = state.cupcakes.read(id).await?;
    Ok(success_one(StatusCode::OK, cupcake))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Outcome, AppError> {
    let input = body_to_input(body)?;
    Ok(state.cupcakes.create(&input).await)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Outcome, AppError> {
    let id = parse_id(&id_str).ok_or_else(|| {
        AppError::MalformedIdentity(format!(
            "Update Error: Cupcake id='{}' was not an integer. No updates occurred.",
            id_str
        ))
    })?;
    let input = body_to_input(body)?;
    Ok(state.cupcakes.update(id, &input).await)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Outcome, AppError> {
    let id = parse_id(&id_str).ok_or_else(|| {
        AppError::MalformedIdentity(format!(
            "Cupcake id='{}' was not an integer. No delete occurred. ",
            id_str
        ))
    })?;
    Ok(state.cupcakes.delete(id).await)
}
