//! Operation outcomes and the JSON envelopes the API responds with.

use crate::error::{AppError, ErrorBody};
use crate::model::Cupcake;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct CupcakeOne {
    pub cupcake: Cupcake,
}

#[derive(Serialize)]
pub struct CupcakeMany {
    pub cupcakes: Vec<Cupcake>,
}

#[derive(Serialize)]
pub struct DeletedBody {
    pub message: Deleted,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Deleted {
    pub deleted: Cupcake,
}

pub fn success_one(status: StatusCode, cupcake: Cupcake) -> (StatusCode, Json<CupcakeOne>) {
    (status, Json(CupcakeOne { cupcake }))
}

pub fn success_many(cupcakes: Vec<Cupcake>) -> (StatusCode, Json<CupcakeMany>) {
    (StatusCode::OK, Json(CupcakeMany { cupcakes }))
}

/// Payload of an [`Outcome`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    Record(Cupcake),
    Deleted(Deleted),
    Text(String),
}

/// Uniform result of a write: whether it succeeded, what to show, and the
/// response code to send.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outcome {
    pub successful: bool,
    pub message: Message,
    pub response_code: u16,
}

impl Outcome {
    pub fn created(result: Result<Cupcake, AppError>) -> Self {
        Self::build(result, StatusCode::CREATED, Message::Record)
    }

    pub fn updated(result: Result<Cupcake, AppError>) -> Self {
        Self::build(result, StatusCode::OK, Message::Record)
    }

    /// `result` carries the snapshot taken before the row was removed.
    pub fn deleted(result: Result<Cupcake, AppError>) -> Self {
        Self::build(result, StatusCode::OK, |deleted| Message::Deleted(Deleted { deleted }))
    }

    pub fn failure(err: &AppError) -> Self {
        Outcome {
            successful: false,
            message: Message::Text(err.to_string()),
            response_code: err.status().as_u16(),
        }
    }

    fn build(result: Result<Cupcake, AppError>, status: StatusCode, wrap: impl FnOnce(Cupcake) -> Message) -> Self {
        match result {
            Ok(cupcake) => Outcome {
                successful: true,
                message: wrap(cupcake),
                response_code: status.as_u16(),
            },
            Err(err) => Self::failure(&err),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.response_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// The record carried by a successful outcome.
    pub fn record(&self) -> Option<&Cupcake> {
        match &self.message {
            Message::Record(c) | Message::Deleted(Deleted { deleted: c }) => Some(c),
            Message::Text(_) => None,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.message {
            Message::Record(cupcake) => success_one(status, cupcake).into_response(),
            Message::Deleted(message) => (status, Json(DeletedBody { message })).into_response(),
            Message::Text(text) => (status, Json(ErrorBody::new(text))).into_response(),
        }
    }
}
