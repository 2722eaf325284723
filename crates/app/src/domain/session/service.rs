//! Session service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use trolley::merge::merge_session_carts;

use crate::{
    domain::{
        cart::CartManager,
        session::identity::{Credentials, IdentityError, IdentityProvider},
    },
    storage::CartStore,
};

/// Errors surfaced by sign-in.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Authentication failed at the identity collaborator.
    #[error("sign-in failed: {0}")]
    Identity(#[from] IdentityError),
}

/// Outcome of a sign-in with the merged cart installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignIn {
    /// The authenticated account.
    pub account_uuid: Uuid,
    /// Lines in the now-authoritative merged cart.
    pub lines_merged: usize,
}

/// Reconciles the anonymous local cart with the identity's server-side
/// cart at the moment authentication succeeds.
pub struct SessionService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn CartStore>,
}

impl SessionService {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn CartStore>) -> Self {
        Self { identity, store }
    }

    /// Signs in and installs the merged cart as the manager's state.
    ///
    /// The pre-authentication cart is captured from the persistent store;
    /// capture failures degrade to an empty local cart and the merge
    /// proceeds with the server cart alone. Local lines override server
    /// lines for the same product: last occurrence wins, quantities are
    /// not summed.
    ///
    /// # Errors
    ///
    /// Returns a `SessionError` when authentication fails. The local
    /// cart is left untouched in that case.
    pub async fn sign_in(
        &self,
        manager: &mut CartManager,
        credentials: &Credentials,
    ) -> Result<SignIn, SessionError> {
        let local = self.store.load();

        let session = self.identity.authenticate(credentials).await?;

        let merged = merge_session_carts(session.server_cart.unwrap_or_default(), local);
        let lines_merged = merged.len();

        debug!(account = %session.account_uuid, lines_merged, "session cart merged");

        manager.replace_lines(merged);

        Ok(SignIn {
            account_uuid: session.account_uuid,
            lines_merged,
        })
    }
}

impl Debug for SessionService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SessionService").finish_non_exhaustive()
    }
}
