//! Bearer credential provider
//!
//! Authentication lives outside the engine; the engine only consumes an
//! opaque bearer token. A provider that yields `None` puts the cart into
//! local-only mode: mutations succeed locally and are never sent remotely,
//! so anonymous browsing keeps working.

use parking_lot::RwLock;

/// Source of the bearer credential attached to storefront calls
pub trait TokenProvider: Send + Sync {
    /// Current bearer token, or `None` when the user is anonymous
    fn bearer_token(&self) -> Option<String>;
}

/// In-memory provider, settable by the host when the session changes
#[derive(Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set(&self, token: Option<String>) {
        *self.token.write() = token;
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
