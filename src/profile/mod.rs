//! Profiles: settings, contacts, wallets, custom hosts and exchange orders of one user.
//!
//! Profiles are shared as [`SharedProfile`] so that synchronizer jobs and foreground callers can
//! both reach them; every repository inside a profile is plain synchronous data.

mod contacts;

mod hosts;

mod profile;

mod repository;

mod types;

mod wallets;

pub use contacts::{Contact, ContactAddress, ContactRepository};
pub use hosts::HostRepository;
pub use profile::{Profile, ProfileData};
pub use repository::{ProfileRepository, SharedProfile};
pub use types::*;
pub use wallets::{ImportMethod, Wallet, WalletRepository};
