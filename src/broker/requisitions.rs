// self
use crate::{
	_prelude::*,
	broker::{self, Broker},
};

/// Body of a requisition (bank-link session) creation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewRequisition {
	/// Institution the end user links.
	pub institution_id: String,
	/// URL the provider redirects to once the user finishes.
	pub redirect: Url,
	/// Caller-chosen unique reference, usable for later lookups.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reference: Option<String>,
	/// Two-letter language code for the provider's consent pages.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_language: Option<String>,
}
impl NewRequisition {
	/// Creates a request for `institution_id` redirecting to `redirect`.
	pub fn new(institution_id: impl Into<String>, redirect: Url) -> Self {
		Self {
			institution_id: institution_id.into(),
			redirect,
			reference: None,
			user_language: None,
		}
	}

	/// Sets the caller reference.
	pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
		self.reference = Some(reference.into());

		self
	}

	/// Sets the consent page language.
	pub fn with_user_language(mut self, language: impl Into<String>) -> Self {
		self.user_language = Some(language.into());

		self
	}
}

impl Broker {
	/// Creates a requisition and returns the provider's record (including the `link`).
	pub async fn create_requisition(&self, requisition: &NewRequisition) -> Result<Option<Value>> {
		let body = serde_json::to_value(requisition)
			.map_err(|err| Error::Provider { status: None, message: err.to_string() })?;

		self.send(Method::POST, "/api/v2/requisitions/", Some(body)).await
	}

	/// Looks a requisition up by id, falling back to a lookup by caller reference.
	pub async fn requisition(&self, id_or_reference: &str) -> Result<Option<Value>> {
		let encoded = broker::encode(id_or_reference);

		if let Some(requisition) = self.get(format!("/api/v2/requisitions/{encoded}/")).await? {
			return Ok(Some(requisition));
		}

		tracing::debug!(
			reference = %id_or_reference,
			"Requisition not found by id; trying reference."
		);

		let Some(page) = self.get(format!("/api/v2/requisitions/?reference={encoded}")).await?
		else {
			return Ok(None);
		};

		Ok(page
			.get("results")
			.and_then(Value::as_array)
			.and_then(|results| results.first())
			.cloned())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn new_requisition_omits_unset_optionals() {
		let redirect = Url::parse("https://app.example.com/callback").expect("URL should parse.");
		let minimal =
			serde_json::to_value(NewRequisition::new("SANDBOXFINANCE_SFIN0000", redirect.clone()))
				.expect("Requisition should serialize.");

		assert_eq!(
			minimal,
			serde_json::json!({
				"institution_id": "SANDBOXFINANCE_SFIN0000",
				"redirect": "https://app.example.com/callback",
			})
		);

		let full = serde_json::to_value(
			NewRequisition::new("SANDBOXFINANCE_SFIN0000", redirect)
				.with_reference("user-42")
				.with_user_language("EN"),
		)
		.expect("Requisition should serialize.");

		assert_eq!(full["reference"], "user-42");
		assert_eq!(full["user_language"], "EN");
	}
}
