//! BIP32/BIP44 public derivation.
//!
//! Only public (non-hardened) child derivation is needed: the device hands out the account-level
//! extended public key and every address below it is derived locally.

use super::types::LedgerError;

use base58check::ToBase58Check;
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha512};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const HARDENED_KEY_LIMIT: u32 = 0x8000_0000;

static SECP: LazyLock<Secp256k1<All>> = LazyLock::new(Secp256k1::new);

/// One level of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildNumber {
	Normal(u32),
	Hardened(u32),
}

impl ChildNumber {
	pub fn index(&self) -> u32 {
		match self {
			ChildNumber::Normal(index) | ChildNumber::Hardened(index) => *index,
		}
	}
}

impl fmt::Display for ChildNumber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChildNumber::Normal(index) => write!(f, "{}", index),
			ChildNumber::Hardened(index) => write!(f, "{}'", index),
		}
	}
}

/// A path such as `m/44'/111'/0'/0/3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
	/// Account-level BIP44 path `m/44'/{slip44}'/{account}'`.
	pub fn bip44_account(slip44: u32, account: u32) -> Self {
		Self(vec![
			ChildNumber::Hardened(44),
			ChildNumber::Hardened(slip44),
			ChildNumber::Hardened(account),
		])
	}

	pub fn child(&self, child: ChildNumber) -> Self {
		let mut components = self.0.clone();
		components.push(child);
		Self(components)
	}

	pub fn components(&self) -> &[ChildNumber] {
		&self.0
	}

	/// Index of the last component, i.e. the address index of a full BIP44 path.
	pub fn last_index(&self) -> Option<u32> {
		self.0.last().map(ChildNumber::index)
	}
}

impl FromStr for DerivationPath {
	type Err = LedgerError;

	fn from_str(path: &str) -> Result<Self, Self::Err> {
		let mut parts = path.split('/');
		if parts.next() != Some("m") {
			return Err(LedgerError::InvalidPath(path.to_string()));
		}

		let components = parts
			.map(|part| {
				let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
					Some(digits) => (digits, true),
					None => (part, false),
				};
				let index: u32 = digits
					.parse()
					.map_err(|_| LedgerError::InvalidPath(path.to_string()))?;
				if index >= HARDENED_KEY_LIMIT {
					return Err(LedgerError::InvalidPath(path.to_string()));
				}
				Ok(if hardened {
					ChildNumber::Hardened(index)
				} else {
					ChildNumber::Normal(index)
				})
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self(components))
	}
}

impl fmt::Display for DerivationPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "m")?;
		for component in &self.0 {
			write!(f, "/{}", component)?;
		}
		Ok(())
	}
}

/// Public key plus chain code, enough to derive non-hardened children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedPublicKey {
	pub public_key: PublicKey,
	pub chain_code: [u8; 32],
}

impl ExtendedPublicKey {
	/// Parse the device format: hex of the 33-byte compressed key followed by the chain code.
	pub fn from_hex(value: &str) -> Result<Self, LedgerError> {
		let bytes = hex::decode(value).map_err(|e| LedgerError::InvalidKey(e.to_string()))?;
		if bytes.len() != 65 {
			return Err(LedgerError::InvalidKey(format!(
				"expected 65 bytes, got {}",
				bytes.len()
			)));
		}

		let public_key =
			PublicKey::from_slice(&bytes[..33]).map_err(|e| LedgerError::InvalidKey(e.to_string()))?;
		let mut chain_code = [0u8; 32];
		chain_code.copy_from_slice(&bytes[33..]);

		Ok(Self {
			public_key,
			chain_code,
		})
	}

	pub fn to_hex(&self) -> String {
		let mut bytes = self.public_key.serialize().to_vec();
		bytes.extend_from_slice(&self.chain_code);
		hex::encode(bytes)
	}

	/// Derive a non-hardened child.
	pub fn derive_child(&self, index: u32) -> Result<ExtendedPublicKey, LedgerError> {
		if index >= HARDENED_KEY_LIMIT {
			return Err(LedgerError::DerivationError(
				"cannot derive a hardened child from a public key".to_string(),
			));
		}

		let mut mac = Hmac::<Sha512>::new_from_slice(&self.chain_code)
			.map_err(|e| LedgerError::DerivationError(e.to_string()))?;
		mac.update(&self.public_key.serialize());
		mac.update(&index.to_be_bytes());
		let result = mac.finalize().into_bytes();
		let (key_bytes, chain_code_bytes) = result.split_at(32);

		let tweak = SecretKey::from_slice(key_bytes)
			.map_err(|e| LedgerError::DerivationError(e.to_string()))?;
		let public_key = self
			.public_key
			.combine(&tweak.public_key(&*SECP))
			.map_err(|e| LedgerError::DerivationError(e.to_string()))?;

		let mut chain_code = [0u8; 32];
		chain_code.copy_from_slice(chain_code_bytes);

		Ok(ExtendedPublicKey {
			public_key,
			chain_code,
		})
	}

	/// Derive along a sequence of non-hardened indices.
	pub fn derive_path(&self, indices: &[u32]) -> Result<ExtendedPublicKey, LedgerError> {
		indices
			.iter()
			.try_fold(self.clone(), |key, index| key.derive_child(*index))
	}

	pub fn public_key_hex(&self) -> String {
		hex::encode(self.public_key.serialize())
	}
}

/// Encode a compressed public key as a base58check address: `version || RIPEMD160(key)`.
pub fn address_from_public_key(public_key: &PublicKey, version: u8) -> String {
	let hash = Ripemd160::digest(public_key.serialize());
	hash.as_slice().to_base58check(version)
}

/// Same as [`address_from_public_key`] for a hex-encoded key.
pub fn address_from_public_key_hex(public_key: &str, version: u8) -> Result<String, LedgerError> {
	let bytes = hex::decode(public_key).map_err(|e| LedgerError::InvalidKey(e.to_string()))?;
	let public_key =
		PublicKey::from_slice(&bytes).map_err(|e| LedgerError::InvalidKey(e.to_string()))?;
	Ok(address_from_public_key(&public_key, version))
}
