use crate::environment::EnvironmentError;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use std::sync::Arc;

/// Future returned by one run of a job.
pub type JobFuture = BoxFuture<'static, Result<(), EnvironmentError>>;

/// A job body; called once per tick.
pub type JobCallback = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// The most recent job failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
	pub job: String,
	pub error: String,
	pub timestamp: DateTime<Utc>,
}

/// Options for [`Synchronizer::stop`](super::Synchronizer::stop).
#[derive(Debug, Clone, Copy, Default)]
pub struct StopOptions {
	/// Also forget the registered jobs, so a later `start` schedules nothing.
	pub clear_timers: bool,
}
