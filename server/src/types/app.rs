//! Tenant application records.
//!
//! Each app owns the secret its tokens are signed with. A token signed with
//! one app's secret must never validate against another app.
//!
//! # Invariants
//! - `name` is non-empty and unique across all apps of a store.
//! - `secret` is non-empty and never leaves token signing/verification.

use std::fmt;

use super::AppId;

/// A registered client application.
#[derive(Clone, PartialEq, Eq)]
pub struct App {
    pub id: AppId,
    pub name: String,
    pub secret: Vec<u8>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}
