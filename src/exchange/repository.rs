//! Exchange transactions owned by a profile.

use super::transaction::{
	ExchangeStatus, ExchangeTransaction, ExchangeTransactionDetail, ExchangeTransactionInput,
};
use super::types::ExchangeError;
use crate::repository::DataRepository;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

/// Fields that may change after an order was created.
#[derive(Debug, Clone, Default)]
pub struct ExchangeTransactionUpdate {
	pub status: Option<ExchangeStatus>,
	pub input: Option<ExchangeTransactionDetail>,
	pub output: Option<ExchangeTransactionDetail>,
}

#[derive(Debug, Clone, Default)]
pub struct ExchangeTransactionRepository {
	data: DataRepository<ExchangeTransaction>,
}

impl ExchangeTransactionRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start tracking a new order. The transaction always starts as `New`.
	pub fn create(&mut self, input: ExchangeTransactionInput) -> ExchangeTransaction {
		let id = uuid::Uuid::new_v4().to_string();
		let transaction = ExchangeTransaction::new(id.clone(), input, Utc::now());
		debug!(
			"Tracking exchange order {} with {}",
			transaction.order_id(),
			transaction.provider()
		);
		self.data.set(id, transaction.clone());
		transaction
	}

	pub fn all(&self) -> Vec<(String, ExchangeTransaction)> {
		self.data.all()
	}

	pub fn values(&self) -> Vec<ExchangeTransaction> {
		self.data.values()
	}

	pub fn keys(&self) -> Vec<String> {
		self.data.keys()
	}

	pub fn find_by_id(&self, id: &str) -> Result<&ExchangeTransaction, ExchangeError> {
		self.data
			.get(id)
			.ok_or_else(|| ExchangeError::NotFound(id.to_string()))
	}

	pub fn find_by_status(&self, status: ExchangeStatus) -> Vec<&ExchangeTransaction> {
		self.data
			.iter()
			.map(|(_, transaction)| transaction)
			.filter(|transaction| transaction.status() == status)
			.collect()
	}

	pub fn pending(&self) -> Vec<&ExchangeTransaction> {
		self.data
			.iter()
			.map(|(_, transaction)| transaction)
			.filter(|transaction| transaction.is_pending())
			.collect()
	}

	/// Apply `update` to the transaction `id`. Any status is accepted.
	pub fn update(&mut self, id: &str, update: ExchangeTransactionUpdate) -> Result<(), ExchangeError> {
		let transaction = self
			.data
			.get_mut(id)
			.ok_or_else(|| ExchangeError::NotFound(id.to_string()))?;

		if let Some(status) = update.status {
			debug!("Exchange order {} moved to {}", transaction.order_id(), status);
			transaction.set_status(status);
		}
		if let Some(input) = update.input {
			transaction.set_input(input);
		}
		if let Some(output) = update.output {
			transaction.set_output(output);
		}

		Ok(())
	}

	pub fn forget(&mut self, id: &str) -> Result<(), ExchangeError> {
		if self.data.missing(id) {
			return Err(ExchangeError::NotFound(id.to_string()));
		}
		self.data.forget(id);
		Ok(())
	}

	pub fn count(&self) -> usize {
		self.data.count()
	}

	pub fn flush(&mut self) {
		self.data.flush();
	}

	/// Replace the contents with persisted transactions keyed by id.
	pub fn fill(&mut self, raw: &Map<String, Value>) -> Result<(), ExchangeError> {
		let transactions = raw
			.iter()
			.map(|(id, value)| Ok((id.clone(), ExchangeTransaction::from_object(value.clone())?)))
			.collect::<Result<Vec<_>, ExchangeError>>()?;
		self.data.fill(transactions);
		Ok(())
	}

	pub fn to_object(&self) -> Result<Map<String, Value>, ExchangeError> {
		self.data
			.iter()
			.map(|(id, transaction)| Ok((id.to_string(), transaction.to_object()?)))
			.collect()
	}
}
