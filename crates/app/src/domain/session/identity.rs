//! Identity collaborator.
//!
//! Authentication itself lives in an external identity service. This
//! crate hands over credentials and consumes the outcome: the resolved
//! account and, with it, whatever cart the identity already has stored
//! server-side.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use uuid::Uuid;

use trolley::items::LineItem;

/// Sign-in input forwarded to the identity collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Password, opaque to this crate.
    pub password: String,
}

/// Successful authentication outcome.
#[derive(Clone, Debug)]
pub struct AuthSession {
    /// The account the collaborator resolved.
    pub account_uuid: Uuid,
    /// The cart stored against this identity, when one exists.
    pub server_cart: Option<Vec<LineItem>>,
}

/// Errors from the identity collaborator.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity service unavailable")]
    Unavailable,
}

/// External identity service.
#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticates and returns the account's session, including any
    /// server-side cart.
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession, IdentityError>;
}

/// Sandbox identity provider.
///
/// Accepts any credentials and returns a fixed server-side cart, which
/// is enough to drive the login merge end to end without a real
/// identity service.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentityProvider {
    server_cart: Option<Vec<LineItem>>,
}

impl StaticIdentityProvider {
    /// A provider whose account has no stored cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose account already holds `server_cart`.
    #[must_use]
    pub fn with_server_cart(server_cart: Vec<LineItem>) -> Self {
        Self {
            server_cart: Some(server_cart),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<AuthSession, IdentityError> {
        Ok(AuthSession {
            account_uuid: Uuid::now_v7(),
            server_cart: self.server_cart.clone(),
        })
    }
}
