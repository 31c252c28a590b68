//! Stateless, signed session tokens (`header.payload.signature`, HS256).
//!
//! Rotating the signing secret invalidates every token issued under the old
//! one. Tokens cannot be revoked individually before they expire.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use cronocodex_core::PrincipalId;

use crate::claims::{TokenClaims, TokenValidationError, validate_claims};
use crate::{AuthError, Role};

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime: 8 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 8 * 60 * 60;

/// Longest session lifetime accepted anywhere: 30 days.
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

const DELIMITER: char = '.';
const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("signing secret must not be empty")]
pub struct EmptySecret;

/// Process-wide token signing key.
///
/// Provisioned once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct SigningSecret {
    mac: HmacSha256,
}

impl SigningSecret {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, EmptySecret> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(bytes).map_err(|_| EmptySecret)?;
        Ok(Self { mac })
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Issues and verifies session tokens.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: SigningSecret,
}

impl TokenCodec {
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    /// Issue a token for `sub` valid for `ttl` from `now`.
    pub fn issue(&self, sub: PrincipalId, role: Role, ttl: Duration, now: DateTime<Utc>) -> String {
        let claims = TokenClaims {
            sub,
            role,
            issued_at: now,
            expires_at: expiry(now, ttl),
        };
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };

        let header = encode_segment(&serde_json::json!(header));
        let payload = encode_segment(&serde_json::json!(claims));
        let signature = self.sign(&header, &payload);

        format!("{header}{DELIMITER}{payload}{DELIMITER}{signature}")
    }

    /// Verify a token and return its claims.
    ///
    /// Every rejection collapses into [`AuthError::TokenInvalid`].
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        self.decode(token, now).map_err(|reason| {
            tracing::debug!(%reason, "rejected session token");
            AuthError::TokenInvalid
        })
    }

    /// Signature check first; nothing in the payload is read before it passes.
    pub(crate) fn decode(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenValidationError> {
        let mut parts = token.split(DELIMITER);
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenValidationError::Malformed("expected three segments"));
        };

        let expected = self.sign(header, payload);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(TokenValidationError::SignatureMismatch);
        }

        let header: TokenHeader = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenValidationError::Malformed("unsupported algorithm"));
        }

        let claims: TokenClaims = decode_segment(payload)?;
        validate_claims(&claims, now)?;
        Ok(claims)
    }

    fn sign(&self, header: &str, payload: &str) -> String {
        let mut mac = self.secret.mac.clone();
        mac.update(header.as_bytes());
        mac.update(&[DELIMITER as u8]);
        mac.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

/// `now + ttl`, saturating at the latest representable instant.
pub(crate) fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn encode_segment(value: &serde_json::Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenValidationError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenValidationError::Malformed("segment is not base64url"))?;
    serde_json::from_slice(&bytes).map_err(|_| TokenValidationError::Malformed("segment is not valid JSON"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(SigningSecret::new(secret).unwrap())
    }

    fn ttl() -> Duration {
        Duration::seconds(DEFAULT_TOKEN_TTL_SECS)
    }

    fn flip_low_bit(token: &str, index: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        bytes[index] ^= 0x01;
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn empty_secret_is_refused() {
        assert_eq!(SigningSecret::new(b"").unwrap_err(), EmptySecret);
        assert_eq!(format!("{:?}", SigningSecret::new("s3cret").unwrap()), "SigningSecret(<redacted>)");
    }

    #[test]
    fn issued_token_verifies_until_expiry() {
        let codec = codec("test-secret");
        let now = Utc::now();
        let sub = PrincipalId::new();
        let token = codec.issue(sub, Role::HrAdmin, ttl(), now);

        assert_eq!(token.split('.').count(), 3);

        let claims = codec.verify(&token, now + Duration::hours(1)).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.role, Role::HrAdmin);
        assert_eq!(claims.expires_at, now + ttl());

        assert_eq!(
            codec.decode(&token, now + ttl()),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(codec.verify(&token, now + ttl()), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_overflowing() {
        let codec = codec("test-secret");
        let now = Utc::now();
        let token = codec.issue(PrincipalId::new(), Role::Worker, Duration::seconds(1_000_000_000_000_000), now);
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(expiry(now, Duration::seconds(1_000_000_000_000_000)), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expiry(now, ttl()), now + ttl());
    }

    #[test]
    fn rotated_secret_invalidates_old_tokens() {
        let now = Utc::now();
        let token = codec("old-secret").issue(PrincipalId::new(), Role::Worker, ttl(), now);
        assert_eq!(
            codec("new-secret").decode(&token, now),
            Err(TokenValidationError::SignatureMismatch)
        );
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        let codec = codec("test-secret");
        let now = Utc::now();
        let token = codec.issue(PrincipalId::new(), Role::Worker, ttl(), now);

        for bad in [
            String::new(),
            "abc".to_string(),
            token.rsplit_once('.').unwrap().0.to_string(),
            format!("{token}."),
            format!("{token}.extra"),
        ] {
            assert!(matches!(
                codec.decode(&bad, now),
                Err(TokenValidationError::Malformed(_))
            ));
        }
    }

    #[test]
    fn signature_prefix_is_not_accepted() {
        let codec = codec("test-secret");
        let now = Utc::now();
        let token = codec.issue(PrincipalId::new(), Role::Worker, ttl(), now);
        let truncated = &token[..token.len() - 1];
        assert_eq!(
            codec.decode(truncated, now),
            Err(TokenValidationError::SignatureMismatch)
        );
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let codec = codec("test-secret");
        let now = Utc::now();
        let token = codec.issue(PrincipalId::new(), Role::AreaManager, ttl(), now);

        for index in 0..token.len() {
            if token.as_bytes()[index] == b'.' {
                continue;
            }
            let mutated = flip_low_bit(&token, index);
            assert_eq!(
                codec.verify(&mutated, now),
                Err(AuthError::TokenInvalid),
                "bit flip at byte {index} was accepted"
            );
        }
    }

    #[test]
    fn forged_payload_with_original_signature_fails() {
        let codec = codec("test-secret");
        let now = Utc::now();
        let token = codec.issue(PrincipalId::new(), Role::Worker, ttl(), now);
        let (header, rest) = token.split_once('.').unwrap();
        let (_, signature) = rest.split_once('.').unwrap();

        let forged_claims = TokenClaims {
            sub: PrincipalId::new(),
            role: Role::GeneralAdmin,
            issued_at: now,
            expires_at: now + ttl(),
        };
        let forged_payload = encode_segment(&serde_json::json!(forged_claims));
        let forged = format!("{header}.{forged_payload}.{signature}");

        assert_eq!(
            codec.decode(&forged, now),
            Err(TokenValidationError::SignatureMismatch)
        );
    }

    proptest! {
        #[test]
        fn verify_returns_issued_identity(
            role_index in 0usize..4,
            ttl_secs in 1i64..(30 * 24 * 3600),
        ) {
            let codec = codec("prop-secret");
            let now = Utc::now();
            let sub = PrincipalId::new();
            let role = Role::ALL[role_index];
            let token = codec.issue(sub, role, Duration::seconds(ttl_secs), now);

            let claims = codec.verify(&token, now).unwrap();
            prop_assert_eq!(claims.sub, sub);
            prop_assert_eq!(claims.role, role);
            prop_assert!(codec.verify(&token, now + Duration::seconds(ttl_secs)).is_err());
        }
    }
}
