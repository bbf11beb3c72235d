//! Prefixed identifiers
//!
//! Every persisted record gets an opaque ID of the form `{prefix}_{random}` where the
//! random part is 96 bits from the thread-local CSPRNG, base64 URL-safe encoded without
//! padding. The prefix tells you what kind of record an ID refers to when it shows up
//! in a log line.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::RngCore;

pub const USER_PREFIX: &str = "usr";
pub const BREACH_PREFIX: &str = "brc";
pub const SITE_CHECK_PREFIX: &str = "chk";
pub const RATING_PREFIX: &str = "rtg";

const ENTROPY_BYTES: usize = 12;

/// Generate a prefixed ID with 96 bits of entropy.
pub fn generate_prefixed_id(prefix: &str) -> String {
    let mut bytes = [0u8; ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    format!("{prefix}_{}", BASE64_URL_SAFE_NO_PAD.encode(bytes))
}
