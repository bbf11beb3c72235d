//! Core functionality for vigil
//!
//! This crate holds everything the score engine needs that is not tied to a storage backend
//! or a transport:
//!
//! - the domain types: [`User`], [`OtpChallenge`], [`Credential`], [`DeviceSession`] and the
//!   three signal kinds ([`BreachSignal`], [`SiteCheck`], [`PasswordRating`]);
//! - the repository traits storage backends implement ([`repositories`]);
//! - the collaborator traits for external services ([`lookup`]);
//! - the pure score reducers ([`score`]);
//! - the services that tie them together ([`services`]).
//!
//! Application code normally goes through the `vigil` facade crate instead of using the
//! services directly.
pub mod cache;
pub mod credential;
pub mod error;
pub mod id;
pub mod lookup;
pub mod otp;
pub mod repositories;
pub mod score;
pub mod services;
pub mod session;
pub mod signal;
pub mod user;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::SessionCache;
pub use credential::{Credential, CredentialClaims, JwtAlgorithm, JwtConfig};
pub use error::Error;
pub use lookup::{BreachLookup, CodeDelivery, ReputationLookup};
pub use otp::{ChallengeReceipt, OtpChallenge};
pub use score::Score;
pub use session::{DeviceSession, Fingerprint, SessionMatch};
pub use signal::{
    BreachInfo, BreachSignal, PasswordRating, RatingScale, RawBreachEntry, SiteCheck,
    SiteCheckReport, SiteVerdict,
};
pub use user::{NewUser, User, UserId, UserProfile};
