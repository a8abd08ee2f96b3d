use super::types::ProfileError;
use crate::repository::DataRepository;

use serde::{Deserialize, Serialize};

/// An address saved for a contact on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactAddress {
	pub coin: String,
	pub network: String,
	pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub addresses: Vec<ContactAddress>,
	#[serde(default)]
	pub starred: bool,
}

/// Address book of a profile, keyed by contact id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactRepository {
	data: DataRepository<Contact>,
}

impl ContactRepository {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn create(&mut self, name: impl Into<String>, addresses: Vec<ContactAddress>) -> Contact {
		let contact = Contact {
			id: uuid::Uuid::new_v4().to_string(),
			name: name.into(),
			addresses,
			starred: false,
		};
		self.data.set(contact.id.clone(), contact.clone());
		contact
	}

	pub fn find_by_id(&self, id: &str) -> Result<&Contact, ProfileError> {
		self.data
			.get(id)
			.ok_or_else(|| ProfileError::ContactNotFound(id.to_string()))
	}

	/// Contacts holding `address`, in insertion order.
	pub fn find_by_address(&self, address: &str) -> Vec<&Contact> {
		self.data
			.iter()
			.map(|(_, contact)| contact)
			.filter(|contact| contact.addresses.iter().any(|a| a.address == address))
			.collect()
	}

	pub fn set_starred(&mut self, id: &str, starred: bool) -> Result<(), ProfileError> {
		let contact = self
			.data
			.get_mut(id)
			.ok_or_else(|| ProfileError::ContactNotFound(id.to_string()))?;
		contact.starred = starred;
		Ok(())
	}

	pub fn forget(&mut self, id: &str) -> Result<(), ProfileError> {
		if self.data.missing(id) {
			return Err(ProfileError::ContactNotFound(id.to_string()));
		}
		self.data.forget(id);
		Ok(())
	}

	pub fn values(&self) -> Vec<Contact> {
		self.data.values()
	}

	pub fn count(&self) -> usize {
		self.data.count()
	}
}
