// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access tokens.

use std::fmt;

use parking_lot::RwLock;

use crate::error::TransportError;

/// A bearer token.
///
/// The token value never appears in `Debug` output or logs.
///
/// # Examples
///
/// ```
/// use landroid_lib::protocol::AuthToken;
///
/// let token = AuthToken::new("eyJhbGciOi...");
/// assert_eq!(format!("{token:?}"), "AuthToken(<redacted>)");
/// assert_eq!(token.expose(), "eyJhbGciOi...");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in a request header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Source of access tokens.
///
/// Acquisition and refresh are up to the implementation. The dispatcher
/// calls [`invalidate`](Self::invalidate) when the transport reports
/// `TransportError::AuthenticationFailed`, so the next
/// [`token`](Self::token) call can fetch a fresh one.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    /// Returns a token for the next command.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if no token can be obtained.
    async fn token(&self) -> Result<AuthToken, TransportError>;

    /// Marks the current token as rejected.
    async fn invalidate(&self);
}

/// A fixed token supplied by the application.
///
/// Once invalidated it refuses to hand out the token again until
/// [`replace`](Self::replace) is called.
#[derive(Debug)]
pub struct StaticToken {
    token: RwLock<Option<AuthToken>>,
}

impl StaticToken {
    /// Creates a store holding `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(AuthToken::new(token))),
        }
    }

    /// Installs a new token.
    pub fn replace(&self, token: impl Into<String>) {
        *self.token.write() = Some(AuthToken::new(token));
    }

    /// Returns `true` if a usable token is held.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.token.read().is_some()
    }
}

impl Default for StaticToken {
    fn default() -> Self {
        Self::new("")
    }
}

impl CredentialStore for StaticToken {
    async fn token(&self) -> Result<AuthToken, TransportError> {
        self.token
            .read()
            .clone()
            .ok_or(TransportError::AuthenticationFailed)
    }

    async fn invalidate(&self) {
        tracing::debug!("Discarding rejected access token");
        *self.token.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_redacted() {
        let token = AuthToken::new("secret-value");
        assert!(!format!("{token:?}").contains("secret"));

        let store = StaticToken::new("secret-value");
        assert!(!format!("{store:?}").contains("secret"));
    }

    #[tokio::test]
    async fn static_token_round_trip() {
        let store = StaticToken::new("abc");
        assert_eq!(store.token().await.unwrap().expose(), "abc");
    }

    #[tokio::test]
    async fn invalidated_token_is_refused_until_replaced() {
        let store = StaticToken::new("abc");
        store.invalidate().await;
        assert!(!store.is_valid());
        assert_eq!(
            store.token().await,
            Err(TransportError::AuthenticationFailed)
        );

        store.replace("def");
        assert_eq!(store.token().await.unwrap().expose(), "def");
    }
}
