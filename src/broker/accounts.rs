// crates.io
use futures::future;
// self
use crate::{
	_prelude::*,
	broker::{self, Broker},
};

impl Broker {
	/// Fetches account metadata; `None` when the provider does not know the account.
	pub async fn account(&self, account_id: &str) -> Result<Option<Value>> {
		self.get(format!("/api/v2/accounts/{}/", broker::encode(account_id))).await
	}

	/// Fetches booked and pending transactions for an account.
	pub async fn account_transactions(&self, account_id: &str) -> Result<Option<Value>> {
		self.get(format!("/api/v2/accounts/{}/transactions/", broker::encode(account_id))).await
	}

	/// Fetches every account linked through a requisition, concurrently.
	///
	/// Returns `None` when the requisition does not exist. Accounts the provider reports as
	/// missing are skipped.
	pub async fn requisition_accounts(&self, requisition_id: &str) -> Result<Option<Vec<Value>>> {
		let Some(requisition) =
			self.get(format!("/api/v2/requisitions/{}/", broker::encode(requisition_id))).await?
		else {
			return Ok(None);
		};
		let account_ids = match requisition.get("accounts") {
			None | Some(Value::Null) => Vec::new(),
			Some(Value::Array(ids)) => ids
				.iter()
				.map(|id| id.as_str().ok_or_else(|| broker::unexpected_shape("requisition")))
				.collect::<Result<Vec<_>>>()?,
			Some(_) => return Err(broker::unexpected_shape("requisition")),
		};
		let accounts = future::try_join_all(account_ids.into_iter().map(|id| self.account(id)))
			.await?
			.into_iter()
			.flatten()
			.collect();

		Ok(Some(accounts))
	}
}
