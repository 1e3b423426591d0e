//! Git collaborator for the re-entry status manager
//!
//! Supplies the current branch name and a HEAD snapshot for the update
//! context. The [`GitProvider`] trait is the seam the core depends on;
//! [`LocalRepo`] is the git2-backed implementation.

pub mod error;
pub mod provider;

pub use error::{Error, Result};
pub use provider::{GitProvider, LocalRepo};
