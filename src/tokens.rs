use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;
use crate::errors::AppError;

const TOKEN_BYTES: usize = 32;

/// A freshly issued bearer token, shaped as the `POST /auth/token` response.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
    pub expires_at: DateTime<Utc>,
}

/// In-memory bearer token store.
///
/// Maps token -> absolute expiry. Entries are never swept in the background:
/// an expired token is evicted the first time it is presented. Tokens do not
/// survive a restart.
#[derive(Clone)]
pub struct TokenStore {
    tokens: Arc<DashMap<String, DateTime<Utc>>>,
    username: String,
    password: String,
    ttl_secs: u64,
}

impl TokenStore {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            username: auth.username.clone(),
            password: auth.password.clone(),
            ttl_secs: auth.token_ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn issue(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        self.issue_at(username, password, Utc::now())
    }

    pub fn issue_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        if !bool::from(user_ok & pass_ok) {
            return Err(AppError::AuthBadCredentials);
        }

        let expires_at = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Backend(anyhow::anyhow!(
                    "token lifetime of {}s overflows the expiry timestamp",
                    self.ttl_secs
                ))
            })?;
        let token = loop {
            let candidate = generate_token();
            if !self.tokens.contains_key(&candidate) {
                break candidate;
            }
        };
        self.tokens.insert(token.clone(), expires_at);

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_secs,
            expires_at,
        })
    }

    /// Validates a raw `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<(), AppError> {
        self.authenticate_at(header, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let token = header
            .and_then(parse_bearer)
            .ok_or(AppError::AuthMissingOrMalformed)?;
        self.check_at(token, now)
    }

    pub fn check_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        let expires_at = match self.tokens.get(token) {
            Some(entry) => *entry.value(),
            None => return Err(AppError::AuthUnknownToken),
        };

        if now > expires_at {
            // conditional so a concurrent caller cannot evict twice
            self.tokens.remove_if(token, |_, exp| now > *exp);
            return Err(AppError::AuthExpiredToken);
        }

        Ok(())
    }

    /// Number of tokens currently held, expired-but-not-yet-evicted included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Extracts the token from `Bearer <token>`. Anything else is malformed.
fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl: u64) -> TokenStore {
        TokenStore::new(&AuthConfig {
            username: "admin".into(),
            password: "s3cret".into(),
            token_ttl_secs: ttl,
        })
    }

    fn bearer(t: &str) -> String {
        format!("Bearer {}", t)
    }

    #[test]
    fn test_issue_rejects_bad_credentials() {
        let s = store(60);
        assert!(matches!(
            s.issue("admin", "wrong"),
            Err(AppError::AuthBadCredentials)
        ));
        assert!(matches!(
            s.issue("root", "s3cret"),
            Err(AppError::AuthBadCredentials)
        ));
        assert!(s.is_empty());
    }

    #[test]
    fn test_issued_token_shape() {
        let s = store(3600);
        let now = Utc::now();
        let issued = s.issue_at("admin", "s3cret", now).unwrap();
        assert_eq!(issued.expires_in, 3600);
        assert_eq!(issued.expires_at, now + Duration::seconds(3600));
        // 32 bytes -> 43 url-safe chars, no padding
        assert_eq!(issued.token.len(), 43);
        assert!(!issued.token.contains('='));
    }

    #[test]
    fn test_tokens_are_distinct() {
        let s = store(60);
        let a = s.issue("admin", "s3cret").unwrap();
        let b = s.issue("admin", "s3cret").unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_valid_until_expiry_inclusive() {
        let s = store(60);
        let now = Utc::now();
        let issued = s.issue_at("admin", "s3cret", now).unwrap();
        let h = bearer(&issued.token);

        assert!(s.authenticate_at(Some(&h), now).is_ok());
        assert!(s.authenticate_at(Some(&h), issued.expires_at).is_ok());
        assert!(matches!(
            s.authenticate_at(Some(&h), issued.expires_at + Duration::milliseconds(1)),
            Err(AppError::AuthExpiredToken)
        ));
    }

    #[test]
    fn test_expired_token_is_evicted_and_never_accepted_again() {
        let s = store(1);
        let now = Utc::now();
        let issued = s.issue_at("admin", "s3cret", now).unwrap();
        let h = bearer(&issued.token);
        let later = now + Duration::seconds(5);

        assert!(matches!(
            s.authenticate_at(Some(&h), later),
            Err(AppError::AuthExpiredToken)
        ));
        assert!(s.is_empty());
        // even a timestamp inside the old validity window no longer helps
        assert!(matches!(
            s.authenticate_at(Some(&h), now),
            Err(AppError::AuthUnknownToken)
        ));
    }

    #[test]
    fn test_malformed_headers() {
        let s = store(60);
        let headers = [
            None,
            Some(""),
            Some("Basic abc"),
            Some("Bearer "),
            Some("bearer abc"),
            Some("Bearer a b"),
        ];
        for h in headers {
            assert!(
                matches!(s.authenticate(h), Err(AppError::AuthMissingOrMalformed)),
                "header {:?}",
                h
            );
        }
    }

    #[test]
    fn test_unknown_token() {
        let s = store(60);
        assert!(matches!(
            s.authenticate(Some("Bearer not-a-token")),
            Err(AppError::AuthUnknownToken)
        ));
    }

    #[test]
    fn test_oversized_ttl_is_an_error_not_a_panic() {
        for ttl in [10_000_000_000_000, i64::MAX as u64, u64::MAX] {
            let s = store(ttl);
            assert!(
                matches!(s.issue("admin", "s3cret"), Err(AppError::Backend(_))),
                "ttl {}",
                ttl
            );
            assert!(s.is_empty(), "ttl {}", ttl);
        }
    }

    #[test]
    fn test_largest_configurable_ttl_issues_a_live_token() {
        let s = store(crate::config::MAX_TOKEN_TTL_SECS);
        let now = Utc::now();
        let issued = s.issue_at("admin", "s3cret", now).unwrap();
        assert!(issued.expires_at > now);
        assert!(s.authenticate_at(Some(&bearer(&issued.token)), now).is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let s = store(60);
        let clone = s.clone();
        let issued = s.issue("admin", "s3cret").unwrap();
        assert!(clone.authenticate(Some(&bearer(&issued.token))).is_ok());
    }
}
