//! Profiles of one environment.

use super::profile::{Profile, ProfileData};
use super::types::ProfileError;
use crate::environment::Container;
use crate::repository::DataRepository;

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// A profile shared between foreground callers and synchronizer jobs.
pub type SharedProfile = Arc<Mutex<Profile>>;

pub struct ProfileRepository {
	container: Arc<Container>,
	data: DataRepository<SharedProfile>,
}

impl ProfileRepository {
	pub fn new(container: Arc<Container>) -> Self {
		Self {
			container,
			data: DataRepository::new(),
		}
	}

	pub fn create(&mut self, name: &str) -> SharedProfile {
		let id = uuid::Uuid::new_v4().to_string();
		let profile = Arc::new(Mutex::new(Profile::new(
			id.clone(),
			name,
			self.container.clone(),
		)));
		info!("Created profile {} ({})", id, name);
		self.data.set(id, profile.clone());
		profile
	}

	pub fn find_by_id(&self, id: &str) -> Result<SharedProfile, ProfileError> {
		self.data
			.get(id)
			.cloned()
			.ok_or_else(|| ProfileError::ProfileNotFound(id.to_string()))
	}

	pub fn has(&self, id: &str) -> bool {
		self.data.has(id)
	}

	pub fn all(&self) -> Vec<(String, SharedProfile)> {
		self.data.all()
	}

	pub fn values(&self) -> Vec<SharedProfile> {
		self.data.values()
	}

	pub fn keys(&self) -> Vec<String> {
		self.data.keys()
	}

	pub fn count(&self) -> usize {
		self.data.count()
	}

	pub fn forget(&mut self, id: &str) -> Result<(), ProfileError> {
		if self.data.missing(id) {
			return Err(ProfileError::ProfileNotFound(id.to_string()));
		}
		self.data.forget(id);
		info!("Forgot profile {}", id);
		Ok(())
	}

	pub fn flush(&mut self) {
		self.data.flush();
	}

	/// Replace every profile with the persisted `profiles` object (`{id: ProfileData}`).
	pub fn fill(&mut self, profiles: &Map<String, Value>) -> Result<(), ProfileError> {
		let restored = profiles
			.iter()
			.map(|(id, value)| {
				let mut data: ProfileData = serde_json::from_value(value.clone())?;
				if data.id.is_empty() {
					data.id = id.clone();
				}
				let profile = Profile::from_data(data, self.container.clone())?;
				Ok((id.clone(), Arc::new(Mutex::new(profile))))
			})
			.collect::<Result<Vec<_>, ProfileError>>()?;

		info!("Restored {} profiles", restored.len());
		self.data.fill(restored);
		Ok(())
	}

	/// Persisted shape of every profile, keyed by id.
	pub async fn to_object(&self) -> Result<Map<String, Value>, ProfileError> {
		let mut profiles = Map::new();
		for (id, profile) in self.data.iter() {
			let data = profile.lock().await.to_data()?;
			profiles.insert(id.to_string(), serde_json::to_value(data)?);
		}
		Ok(profiles)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::container;

	#[tokio::test]
	async fn create_find_and_forget() {
		let mut profiles = ProfileRepository::new(container());
		let profile = profiles.create("Jane");
		let id = profile.lock().await.id().to_string();

		let found = profiles.find_by_id(&id).unwrap();
		assert!(Arc::ptr_eq(&profile, &found));

		profiles.forget(&id).unwrap();
		assert!(matches!(
			profiles.find_by_id(&id),
			Err(ProfileError::ProfileNotFound(_))
		));
		assert!(profiles.forget(&id).is_err());
	}

	#[tokio::test]
	async fn to_object_round_trips_through_fill() {
		let mut profiles = ProfileRepository::new(container());
		profiles.create("Jane");
		profiles.create("John");

		let object = profiles.to_object().await.unwrap();
		let mut restored = ProfileRepository::new(container());
		restored.fill(&object).unwrap();

		assert_eq!(restored.keys(), profiles.keys());
		let first = restored.values()[0].clone();
		assert_eq!(first.lock().await.name(), "Jane");
	}
}
