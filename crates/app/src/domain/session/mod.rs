//! Session

pub mod identity;
pub mod service;

pub use identity::{
    AuthSession, Credentials, IdentityError, IdentityProvider, StaticIdentityProvider,
};
pub use service::{SessionError, SessionService, SignIn};
