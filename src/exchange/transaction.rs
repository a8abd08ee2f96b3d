use super::types::ExchangeError;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Status of a swap order.
///
/// The ordinal order is meaningful: `is_pending` is `status < Finished`. Note that `Failed`,
/// `Refunded`, `Verifying` and `Expired` all sort after `Finished` and are therefore not pending,
/// even though `Verifying` is not a terminal state on every provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ExchangeStatus {
	New = 0,
	Waiting = 1,
	Confirming = 2,
	Exchanging = 3,
	Sending = 4,
	Finished = 5,
	Failed = 6,
	Refunded = 7,
	Verifying = 8,
	Expired = 9,
}

impl ExchangeStatus {
	pub const ALL: [ExchangeStatus; 10] = [
		ExchangeStatus::New,
		ExchangeStatus::Waiting,
		ExchangeStatus::Confirming,
		ExchangeStatus::Exchanging,
		ExchangeStatus::Sending,
		ExchangeStatus::Finished,
		ExchangeStatus::Failed,
		ExchangeStatus::Refunded,
		ExchangeStatus::Verifying,
		ExchangeStatus::Expired,
	];
}

impl From<ExchangeStatus> for u8 {
	fn from(status: ExchangeStatus) -> Self {
		status as u8
	}
}

impl TryFrom<u8> for ExchangeStatus {
	type Error = ExchangeError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		ExchangeStatus::ALL
			.get(value as usize)
			.copied()
			.ok_or(ExchangeError::InvalidStatus(value))
	}
}

impl std::fmt::Display for ExchangeStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(self, f)
	}
}

/// One side of a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeTransactionDetail {
	pub address: String,
	pub amount: f64,
	pub ticker: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hash: Option<String>,
}

/// Data needed to create an exchange transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeTransactionInput {
	pub order_id: String,
	pub provider: String,
	pub input: ExchangeTransactionDetail,
	pub output: ExchangeTransactionDetail,
}

/// A swap order tracked on behalf of a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeTransaction {
	id: String,
	order_id: String,
	provider: String,
	input: ExchangeTransactionDetail,
	output: ExchangeTransactionDetail,
	status: ExchangeStatus,
	#[serde(with = "chrono::serde::ts_milliseconds")]
	created_at: DateTime<Utc>,
}

impl ExchangeTransaction {
	/// `created_at` is truncated to milliseconds, the precision it is stored with.
	pub fn new(id: String, input: ExchangeTransactionInput, created_at: DateTime<Utc>) -> Self {
		Self {
			id,
			order_id: input.order_id,
			provider: input.provider,
			input: input.input,
			output: input.output,
			status: ExchangeStatus::New,
			created_at: created_at.trunc_subsecs(3),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn order_id(&self) -> &str {
		&self.order_id
	}

	pub fn provider(&self) -> &str {
		&self.provider
	}

	pub fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}

	pub fn input(&self) -> &ExchangeTransactionDetail {
		&self.input
	}

	pub fn set_input(&mut self, input: ExchangeTransactionDetail) {
		self.input = input;
	}

	pub fn output(&self) -> &ExchangeTransactionDetail {
		&self.output
	}

	pub fn set_output(&mut self, output: ExchangeTransactionDetail) {
		self.output = output;
	}

	pub fn status(&self) -> ExchangeStatus {
		self.status
	}

	/// Accepts any status; progression is the caller's responsibility.
	pub fn set_status(&mut self, status: ExchangeStatus) {
		self.status = status;
	}

	pub fn is_pending(&self) -> bool {
		self.status < ExchangeStatus::Finished
	}

	pub fn is_expired(&self) -> bool {
		self.status == ExchangeStatus::Expired
	}

	pub fn is_failed(&self) -> bool {
		self.status == ExchangeStatus::Failed
	}

	pub fn is_finished(&self) -> bool {
		self.status == ExchangeStatus::Finished
	}

	pub fn is_refunded(&self) -> bool {
		self.status == ExchangeStatus::Refunded
	}

	pub fn to_object(&self) -> Result<serde_json::Value, ExchangeError> {
		Ok(serde_json::to_value(self)?)
	}

	pub fn from_object(value: serde_json::Value) -> Result<Self, ExchangeError> {
		Ok(serde_json::from_value(value)?)
	}
}
