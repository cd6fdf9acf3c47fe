//! Authentication: the bearer credential the core needs.
//!
//! ## Security Model
//!
//! - Login/registration and token storage belong to the embedding application.
//!   The SDK only receives an already-issued token.
//! - The token is injected as `Authorization: Bearer <token>` by the HTTP layer.
//!   It is NEVER printed: `Debug` and `Display` are redacted.
//! - No credential is a valid state. Public read endpoints work without one,
//!   protected endpoints answer `401` which maps to `HttpError::Unauthorized`.

use serde::{Deserialize, Serialize};

/// An opaque bearer token.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token. Blank tokens are treated as "not authenticated".
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Value for the `Authorization` header.
    pub(crate) fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}
