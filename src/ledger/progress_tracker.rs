//! Progress tracking for hardware wallet address discovery.
//!
//! This module provides the `DiscoveryProgressTracker`, which records how many pages and addresses
//! a scan went through and how many funded wallets it found. The discovery service uses it to log
//! progress and to report statistics once the scan ends.

use tracing::info;

/// Service for tracking discovery progress
///
/// The tracker records each scanned page, the highest derived address index, and the wallets
/// found along the way.
#[derive(Debug, Clone)]
pub struct DiscoveryProgressTracker {
	/// Address index the scan started from
	start_index: u32,
	/// Highest address index derived so far
	highest_index: Option<u32>,
	/// Pages scanned, including the final empty one
	pages_scanned: u32,
	/// Total addresses derived
	addresses_derived: usize,
	/// Total funded wallets found
	wallets_found: usize,
	/// Page at which progress was last logged
	last_logged_page: u32,
	/// Whether the scan stopped on the page cap instead of an empty page
	hit_page_cap: bool,
}

impl DiscoveryProgressTracker {
	/// Create a new tracker starting from the given address index.
	pub fn new(start_index: u32) -> Self {
		Self {
			start_index,
			highest_index: None,
			pages_scanned: 0,
			addresses_derived: 0,
			wallets_found: 0,
			last_logged_page: 0,
			hit_page_cap: false,
		}
	}

	/// Record one scanned page.
	pub fn record_page(&mut self, highest_index: u32, addresses: usize, wallets: usize) {
		self.pages_scanned += 1;
		self.addresses_derived += addresses;
		self.wallets_found += wallets;
		self.highest_index = Some(self.highest_index.map_or(highest_index, |h| h.max(highest_index)));
	}

	pub fn record_page_cap(&mut self) {
		self.hit_page_cap = true;
	}

	/// Log progress every 10 pages or when forced
	pub fn log_progress(&mut self, force: bool) {
		let pages_since_last_log = self.pages_scanned.saturating_sub(self.last_logged_page);
		if force || pages_since_last_log >= 10 {
			info!(
				"Discovery progress: {} pages, {} addresses derived, {} wallets found",
				self.pages_scanned, self.addresses_derived, self.wallets_found
			);
			self.last_logged_page = self.pages_scanned;
		}
	}

	pub fn get_stats(&self) -> DiscoveryStats {
		DiscoveryStats {
			start_index: self.start_index,
			highest_index: self.highest_index,
			pages_scanned: self.pages_scanned,
			addresses_derived: self.addresses_derived,
			wallets_found: self.wallets_found,
			hit_page_cap: self.hit_page_cap,
		}
	}
}

/// Statistics about a finished scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryStats {
	pub start_index: u32,
	pub highest_index: Option<u32>,
	pub pages_scanned: u32,
	pub addresses_derived: usize,
	pub wallets_found: usize,
	pub hit_page_cap: bool,
}

impl DiscoveryStats {
	pub fn summary(&self) -> String {
		format!(
			"Scanned {} pages from index {}{}: {} addresses, {} wallets{}",
			self.pages_scanned,
			self.start_index,
			self.highest_index
				.map(|index| format!(" to {}", index))
				.unwrap_or_default(),
			self.addresses_derived,
			self.wallets_found,
			if self.hit_page_cap { " (page cap reached)" } else { "" }
		)
	}
}
