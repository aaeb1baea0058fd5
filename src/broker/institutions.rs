// self
use crate::{
	_prelude::*,
	broker::{self, Broker},
};

impl Broker {
	/// Lists institutions, optionally restricted to an ISO 3166 country code.
	pub async fn institutions(&self, country: Option<&str>) -> Result<Option<Value>> {
		let path = match country {
			Some(code) => format!("/api/v2/institutions/?country={}", broker::encode(code)),
			None => "/api/v2/institutions/".to_owned(),
		};

		self.get(path).await
	}

	/// Returns the sorted, de-duplicated country codes served by any institution.
	pub async fn institution_countries(&self) -> Result<Vec<String>> {
		let Some(institutions) = self.institutions(None).await? else {
			return Ok(Vec::new());
		};

		collect_countries(&institutions)
	}
}

fn collect_countries(institutions: &Value) -> Result<Vec<String>> {
	let entries =
		institutions.as_array().ok_or_else(|| broker::unexpected_shape("institutions"))?;
	let mut countries = BTreeSet::new();

	for entry in entries {
		let Some(codes) = entry.get("countries").and_then(Value::as_array) else {
			continue;
		};

		countries.extend(codes.iter().filter_map(Value::as_str).map(str::to_owned));
	}

	Ok(countries.into_iter().collect())
}
