//! Interval-driven background jobs.
//!
//! This module defines the `Synchronizer`, a named set of jobs each running on its own timer. A job
//! that fails is recorded as the synchronizer's latest [`JobFailure`] and keeps its schedule; no
//! failure ever stops another job or the failing job's next tick.
//!
//! Timers are tokio tasks. `stop` aborts them between ticks; a run that is already executing is
//! cancelled at its next suspension point, and nothing is rolled back.

mod types;

pub use types::*;

use chrono::Utc;
use futures_util::future::join_all;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

#[derive(Clone)]
struct Job {
	name: String,
	interval: Duration,
	callback: JobCallback,
}

#[derive(Default)]
pub struct Synchronizer {
	jobs: Vec<Job>,
	timers: Vec<JoinHandle<()>>,
	failure: Arc<Mutex<Option<JobFailure>>>,
}

impl Synchronizer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a job. Re-registering a name replaces the previous job.
	pub fn add<F>(&mut self, name: impl Into<String>, interval: Duration, callback: F)
	where
		F: Fn() -> JobFuture + Send + Sync + 'static,
	{
		let name = name.into();
		self.jobs.retain(|job| job.name != name);
		self.jobs.push(Job {
			name,
			interval,
			callback: Arc::new(callback),
		});
	}

	pub fn jobs(&self) -> Vec<String> {
		self.jobs.iter().map(|job| job.name.clone()).collect()
	}

	pub fn is_running(&self) -> bool {
		!self.timers.is_empty()
	}

	/// Schedule every job on its own interval. The first run of each job happens one interval from now.
	pub fn start(&mut self) {
		self.cancel_timers();

		for job in &self.jobs {
			let job = job.clone();
			let failure = self.failure.clone();
			debug!("Scheduling job {} every {:?}", job.name, job.interval);

			self.timers.push(tokio::spawn(async move {
				let mut ticker = tokio::time::interval_at(Instant::now() + job.interval, job.interval);
				ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
				loop {
					ticker.tick().await;
					run_job(&job, &failure).await;
				}
			}));
		}

		info!("Started {} synchronizer jobs", self.timers.len());
	}

	/// Run every job once, concurrently, regardless of timers.
	pub async fn run_all(&self) {
		join_all(self.jobs.iter().map(|job| run_job(job, &self.failure))).await;
	}

	/// Run a single job once. Returns `false` if no job has that name.
	pub async fn run(&self, name: &str) -> bool {
		match self.jobs.iter().find(|job| job.name == name) {
			Some(job) => {
				run_job(job, &self.failure).await;
				true
			}
			None => false,
		}
	}

	pub fn stop(&mut self, options: StopOptions) {
		self.cancel_timers();
		if options.clear_timers {
			self.jobs.clear();
		}
		info!("Stopped synchronizer");
	}

	/// Latest failure across all jobs.
	pub fn error(&self) -> Option<JobFailure> {
		self.failure
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	pub fn clear_error(&self) {
		*self.failure.lock().unwrap_or_else(PoisonError::into_inner) = None;
	}

	fn cancel_timers(&mut self) {
		for timer in self.timers.drain(..) {
			timer.abort();
		}
	}
}

impl Drop for Synchronizer {
	fn drop(&mut self) {
		self.cancel_timers();
	}
}

async fn run_job(job: &Job, failure: &Mutex<Option<JobFailure>>) {
	debug!("Running job {}", job.name);
	if let Err(e) = (job.callback)().await {
		error!("Job {} failed: {}", job.name, e);
		*failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(JobFailure {
			job: job.name.clone(),
			error: e.to_string(),
			timestamp: Utc::now(),
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::environment::EnvironmentError;
	use crate::network::LookupError;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn counting(counter: &Arc<AtomicUsize>) -> impl Fn() -> JobFuture + Send + Sync + 'static {
		let counter = counter.clone();
		move || -> JobFuture {
			let counter = counter.clone();
			Box::pin(async move {
				counter.fetch_add(1, Ordering::SeqCst);
				Ok::<(), EnvironmentError>(())
			})
		}
	}

	fn failing(counter: &Arc<AtomicUsize>) -> impl Fn() -> JobFuture + Send + Sync + 'static {
		let counter = counter.clone();
		move || -> JobFuture {
			let counter = counter.clone();
			Box::pin(async move {
				counter.fetch_add(1, Ordering::SeqCst);
				Err::<(), _>(EnvironmentError::Lookup(LookupError::NoData))
			})
		}
	}

	#[tokio::test(start_paused = true)]
	async fn failing_job_does_not_stop_others() {
		let failures = Arc::new(AtomicUsize::new(0));
		let successes = Arc::new(AtomicUsize::new(0));

		let mut synchronizer = Synchronizer::new();
		synchronizer.add("broken", Duration::from_secs(10), failing(&failures));
		synchronizer.add("healthy", Duration::from_secs(15), counting(&successes));
		synchronizer.start();

		tokio::time::sleep(Duration::from_secs(31)).await;

		assert_eq!(failures.load(Ordering::SeqCst), 3);
		assert_eq!(successes.load(Ordering::SeqCst), 2);

		let error = synchronizer.error().unwrap();
		assert_eq!(error.job, "broken");
		assert!(error.error.contains("No data returned"));

		synchronizer.clear_error();
		assert!(synchronizer.error().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn stop_cancels_timers() {
		let runs = Arc::new(AtomicUsize::new(0));
		let mut synchronizer = Synchronizer::new();
		synchronizer.add("job", Duration::from_secs(5), counting(&runs));
		synchronizer.start();

		tokio::time::sleep(Duration::from_secs(6)).await;
		synchronizer.stop(StopOptions::default());
		tokio::time::sleep(Duration::from_secs(60)).await;

		assert_eq!(runs.load(Ordering::SeqCst), 1);
		assert!(!synchronizer.is_running());
		assert_eq!(synchronizer.jobs(), vec!["job".to_string()]);

		synchronizer.stop(StopOptions { clear_timers: true });
		assert!(synchronizer.jobs().is_empty());
	}

	#[tokio::test]
	async fn run_all_runs_each_job_once_and_records_latest_error() {
		let runs = Arc::new(AtomicUsize::new(0));
		let failures = Arc::new(AtomicUsize::new(0));
		let mut synchronizer = Synchronizer::new();
		synchronizer.add("ok", Duration::from_secs(3600), counting(&runs));
		synchronizer.add("broken", Duration::from_secs(3600), failing(&failures));

		synchronizer.run_all().await;
		assert_eq!(runs.load(Ordering::SeqCst), 1);
		assert_eq!(failures.load(Ordering::SeqCst), 1);
		assert_eq!(synchronizer.error().unwrap().job, "broken");

		assert!(synchronizer.run("ok").await);
		assert!(!synchronizer.run("missing").await);
		assert_eq!(runs.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn later_failures_overwrite_earlier_ones() {
		let counter = Arc::new(AtomicUsize::new(0));
		let mut synchronizer = Synchronizer::new();
		synchronizer.add("first", Duration::from_secs(1), failing(&counter));
		synchronizer.add("second", Duration::from_secs(1), failing(&counter));

		synchronizer.run("first").await;
		let first = synchronizer.error().unwrap();
		synchronizer.run("second").await;
		let second = synchronizer.error().unwrap();

		assert_eq!(second.job, "second");
		assert!(second.timestamp >= first.timestamp);
	}
}
