//! Shared fixtures for unit and end-to-end tests.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthService, PasswordHasher};
use crate::storage::MemoryStorage;
use crate::types::UserId;

/// Token lifetime used by test services.
pub const TEST_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Create an auth service over a fresh in-memory store.
///
/// Uses the cheapest Argon2 parameters so tests do not spend their time
/// hashing. Returns the store too, so tests can seed admin rights.
#[must_use]
pub fn new_test_service() -> (Arc<AuthService<MemoryStorage>>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let service = AuthService::new(Arc::clone(&storage), TEST_TOKEN_TTL)
        .with_hasher(PasswordHasher::insecure_fast());
    (Arc::new(service), storage)
}

/// Register a user and grant them admin rights.
///
/// # Panics
/// Panics if registration fails.
pub async fn register_admin(
    service: &AuthService<MemoryStorage>,
    storage: &MemoryStorage,
    email: &str,
    password: &str,
) -> UserId {
    #[allow(clippy::expect_used)]
    let user_id = service
        .register_new_user(email, password)
        .await
        .expect("Failed to register admin");
    #[allow(clippy::expect_used)]
    storage
        .set_admin(user_id, true)
        .expect("Failed to grant admin rights");
    user_id
}
