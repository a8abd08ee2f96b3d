//! Swap orders placed through third-party exchange providers.
//!
//! An [`ExchangeTransaction`] carries an ordinal [`ExchangeStatus`]; the repository tracks the
//! transactions of one profile and never validates status transitions.

mod repository;

mod transaction;

mod types;

pub use repository::{ExchangeTransactionRepository, ExchangeTransactionUpdate};
pub use transaction::{
	ExchangeStatus, ExchangeTransaction, ExchangeTransactionDetail, ExchangeTransactionInput,
};
pub use types::*;
