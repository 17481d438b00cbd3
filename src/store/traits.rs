//! `RegistrationStore` trait: the async interface to the record store.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::leads::model::Registration;

/// Backend-agnostic record store.
///
/// `insert_registration` must report a duplicate email as
/// `DatabaseError::Constraint` so callers can tell a lost race apart from a
/// broken store.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Whether a registration with this (normalized) email exists. Checks the
    /// key only, so an unreadable row still counts.
    async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError>;

    /// Insert a new registration.
    async fn insert_registration(&self, registration: &Registration) -> Result<(), DatabaseError>;

    /// All registrations, newest first.
    async fn list_registrations(&self) -> Result<Vec<Registration>, DatabaseError>;

    /// Number of stored registrations.
    async fn count_registrations(&self) -> Result<usize, DatabaseError> {
        Ok(self.list_registrations().await?.len())
    }
}
