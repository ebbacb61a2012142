//! Bearer credentials issued by the authorization endpoint

use std::time::{Duration, Instant};

use crate::constants::{MAX_TOKEN_LIFETIME_SECS, TOKEN_EXPIRY_MARGIN_SECS};

/// An access token together with the instant it was obtained.
///
/// Never mutated in place: a refresh replaces the whole value.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// Bearer value
    pub access_token: String,
    /// Lifetime advertised by the token endpoint
    pub expires_in: Duration,
    /// When the token endpoint answered
    pub obtained_at: Instant,
}

impl AuthToken {
    /// Lifetimes above [`MAX_TOKEN_LIFETIME_SECS`] are clamped to it.
    pub fn new(access_token: impl Into<String>, expires_in_secs: u64, obtained_at: Instant) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in: Duration::from_secs(expires_in_secs.min(MAX_TOKEN_LIFETIME_SECS)),
            obtained_at,
        }
    }

    /// Instant from which the token is no longer handed out.
    pub fn refresh_deadline(&self) -> Instant {
        let usable = self.expires_in.saturating_sub(Duration::from_secs(TOKEN_EXPIRY_MARGIN_SECS));
        self.obtained_at + usable
    }

    /// `true` at or past `obtained_at + expires_in - 60s`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.refresh_deadline()
    }

    /// Time left before the real (un-margined) expiry.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        (self.obtained_at + self.expires_in).saturating_duration_since(now)
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}
