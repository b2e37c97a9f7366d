use std::collections::HashMap;

use axum::{
	Json, Router,
	body::Bytes,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AppState;
use helena_providers::whatsapp;
use helena_service::{Error as ServiceError, InboundOutcome, ListingSummary, NextListing, RegisterResponse};

const INVALID_JSON: &str = "Requisição inválida (JSON esperado)";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/preferences", post(register).fallback(method_not_allowed))
		.route("/v1/listings/next", get(next_listing))
		.route("/v1/listings/summary", get(summary))
		.route("/webhooks/whatsapp", get(whatsapp_verify).post(whatsapp_inbound))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct UserCodeQuery {
	user_code: Option<String>,
}
impl UserCodeQuery {
	fn require(self) -> Result<String, ApiError> {
		self.user_code
			.map(|code| code.trim().to_string())
			.filter(|code| !code.is_empty())
			.ok_or_else(|| {
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", "user_code is required.")
			})
	}
}

#[derive(Debug, Serialize)]
struct StatusBody {
	status: &'static str,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn register(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Json<RegisterResponse>, ApiError> {
	let payload = parse_json(&body)?;
	let response = state.service.register_preferences(payload).await?;

	Ok(Json(response))
}

async fn method_not_allowed() -> ApiError {
	json_error(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", "Método não permitido")
}

async fn next_listing(
	State(state): State<AppState>,
	Query(query): Query<UserCodeQuery>,
) -> Result<Json<NextListing>, ApiError> {
	let user_code = query.require()?;
	let response = state.service.next_listing(&user_code).await?;

	Ok(Json(response))
}

async fn summary(
	State(state): State<AppState>,
	Query(query): Query<UserCodeQuery>,
) -> Result<Json<ListingSummary>, ApiError> {
	let user_code = query.require()?;
	let response = state.service.summarize_listings(&user_code).await?;

	Ok(Json(response))
}

async fn whatsapp_verify(
	State(state): State<AppState>,
	Query(params): Query<HashMap<String, String>>,
) -> Response {
	let expected = state.service.cfg.whatsapp.verify_token.as_deref();
	let token = params.get("hub.verify_token").map(String::as_str);

	match (expected, token) {
		(Some(expected), Some(token)) if expected == token => {
			let challenge = params.get("hub.challenge").cloned().unwrap_or_default();

			(StatusCode::OK, challenge).into_response()
		},
		_ => {
			tracing::warn!("Webhook verification rejected.");

			(StatusCode::FORBIDDEN, "Token de verificação inválido").into_response()
		},
	}
}

async fn whatsapp_inbound(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Json<StatusBody>, ApiError> {
	let payload = parse_json(&body)?;
	let Some(messages) = whatsapp::inbound_messages(&payload) else {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			"Webhook payload has no entries.",
		));
	};
	let mut limited = false;

	for (sender, text) in messages {
		match state.service.receive_message(&sender, &text).await {
			Ok(InboundOutcome::RateLimited) => limited = true,
			Ok(InboundOutcome::Accepted) => {},
			Err(err) => {
				tracing::error!(error = %err, sender = %sender, "Inbound message dropped.");
			},
		}
	}

	Ok(Json(StatusBody { status: if limited { "timeout" } else { "ok" } }))
}

fn parse_json(body: &[u8]) -> Result<Value, ApiError> {
	serde_json::from_slice(body)
		.map_err(|_| json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", INVALID_JSON))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	status: &'static str,
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage failure.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", "Erro interno")
			},
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Provider failure.");

				json_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { status: "error", error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
