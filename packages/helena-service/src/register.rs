use serde::Serialize;
use serde_json::Value;

use crate::{Error, HelenaService, Result};
use helena_domain::PreferenceRecord;

pub const SESSION_ID_KEY: &str = "dialogflowSessionId";

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
	pub status: &'static str,
	pub message: String,
	pub dados_recebidos: Value,
}

impl HelenaService {
	/// Stores the criteria carried by a dialog webhook body under its session id.
	pub async fn register_preferences(&self, body: Value) -> Result<RegisterResponse> {
		if !body.is_object() {
			return Err(Error::InvalidRequest {
				message: "Requisição inválida (JSON esperado)".to_string(),
			});
		}

		let Some(session_id) = body
			.get(SESSION_ID_KEY)
			.and_then(Value::as_str)
			.map(str::trim)
			.filter(|id| !id.is_empty())
			.map(str::to_string)
		else {
			return Err(Error::InvalidRequest { message: format!("{SESSION_ID_KEY} is required.") });
		};
		let record = PreferenceRecord::from_value(&body);

		tracing::debug!(
			session_id = %session_id,
			property_type = ?record.property_type,
			transaction_type = ?record.transaction_type,
			"Registering search criteria."
		);

		self.preferences().save(&session_id, &record).await?;

		Ok(RegisterResponse {
			status: "success",
			message: format!("Critérios registrados com ID {session_id}."),
			dados_recebidos: body,
		})
	}
}
