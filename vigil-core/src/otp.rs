//! One-time codes for passwordless sign-in
//!
//! A user holds at most one live [`OtpChallenge`]. Issuing a new one overwrites whatever was
//! pending; a successful verification consumes it.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Number of minutes a freshly issued code stays valid.
pub const DEFAULT_OTP_TTL_MINUTES: i64 = 15;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Draw a new six digit code that expires `ttl` from now.
    pub fn generate(ttl: Duration) -> Self {
        let code = rand::rng().random_range(CODE_MIN..=CODE_MAX);
        Self {
            code: format!("{code:06}"),
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn new(code: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            expires_at,
        }
    }

    /// A challenge is dead from the instant of its expiry onwards.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Byte-for-byte comparison against a submitted code.
    pub fn matches(&self, code: &str) -> bool {
        self.code.as_bytes() == code.as_bytes()
    }

    /// True when `code` matches and the challenge is still live at `now`.
    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        self.matches(code) && !self.is_expired(now)
    }
}

/// What a caller learns after asking for a code.
///
/// The challenge stays stored even when delivery failed, so `delivered` is the only signal
/// that the user never received it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeReceipt {
    pub user_id: UserId,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub delivered: bool,
}
