//! Process configuration, read from the environment once at startup.

use std::fmt;
use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use cronocodex_auth::{AuthConfig, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, SigningSecret};

pub const SIGNING_SECRET_VAR: &str = "CRONOCODEX_SIGNING_SECRET";
pub const TOKEN_TTL_VAR: &str = "CRONOCODEX_TOKEN_TTL_SECS";
pub const BIND_ADDR_VAR: &str = "CRONOCODEX_BIND_ADDR";
pub const BOOTSTRAP_EMAIL_VAR: &str = "CRONOCODEX_BOOTSTRAP_ADMIN_EMAIL";
pub const BOOTSTRAP_PASSWORD_VAR: &str = "CRONOCODEX_BOOTSTRAP_ADMIN_PASSWORD";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set to a non-empty value")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Root general admin created on first start.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub signing_secret: SigningSecret,
    pub token_ttl: Duration,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. There is no fallback signing secret.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let present = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let signing_secret = present(SIGNING_SECRET_VAR)
            .and_then(|s| SigningSecret::new(s).ok())
            .ok_or(ConfigError::Missing(SIGNING_SECRET_VAR))?;

        let token_ttl = match present(TOKEN_TTL_VAR) {
            Some(raw) => {
                let secs: i64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: TOKEN_TTL_VAR,
                    reason: format!("`{raw}` is not a number of seconds"),
                })?;
                if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
                    return Err(ConfigError::Invalid {
                        var: TOKEN_TTL_VAR,
                        reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"),
                    });
                }
                Duration::try_seconds(secs).ok_or_else(|| ConfigError::Invalid {
                    var: TOKEN_TTL_VAR,
                    reason: format!("`{raw}` is out of range"),
                })?
            }
            None => Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        };

        let bind_raw = present(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: BIND_ADDR_VAR,
            reason: format!("`{bind_raw}` is not a socket address"),
        })?;

        let bootstrap_admin = match (present(BOOTSTRAP_EMAIL_VAR), present(BOOTSTRAP_PASSWORD_VAR)) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(BOOTSTRAP_PASSWORD_VAR)),
            (None, Some(_)) => return Err(ConfigError::Missing(BOOTSTRAP_EMAIL_VAR)),
        };

        Ok(Self {
            bind_addr,
            signing_secret,
            token_ttl,
            bootstrap_admin,
        })
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.signing_secret.clone()).with_token_ttl(self.token_ttl)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| vars.get(k).cloned()
    }

    #[test]
    fn signing_secret_is_required() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing(SIGNING_SECRET_VAR)
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(SIGNING_SECRET_VAR, "   ")])).unwrap_err(),
            ConfigError::Missing(SIGNING_SECRET_VAR)
        );
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(lookup(&[(SIGNING_SECRET_VAR, "s3cret")])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.token_ttl, Duration::hours(8));
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn ttl_must_be_positive_seconds() {
        for bad in ["abc", "0", "-5"] {
            let err = AppConfig::from_lookup(lookup(&[(SIGNING_SECRET_VAR, "s"), (TOKEN_TTL_VAR, bad)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: TOKEN_TTL_VAR, .. }), "{bad}");
        }
        let config =
            AppConfig::from_lookup(lookup(&[(SIGNING_SECRET_VAR, "s"), (TOKEN_TTL_VAR, "60")])).unwrap();
        assert_eq!(config.token_ttl, Duration::seconds(60));
    }

    #[test]
    fn ttl_above_the_maximum_is_rejected() {
        for huge in ["9223372036854775807", "1000000000000000", "2592001"] {
            let err = AppConfig::from_lookup(lookup(&[(SIGNING_SECRET_VAR, "s"), (TOKEN_TTL_VAR, huge)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: TOKEN_TTL_VAR, .. }), "{huge}");
        }

        let max = MAX_TOKEN_TTL_SECS.to_string();
        let config =
            AppConfig::from_lookup(lookup(&[(SIGNING_SECRET_VAR, "s"), (TOKEN_TTL_VAR, max.as_str())])).unwrap();
        assert_eq!(config.token_ttl, Duration::seconds(MAX_TOKEN_TTL_SECS));
        assert_eq!(config.auth_config().token_ttl, Duration::seconds(MAX_TOKEN_TTL_SECS));
    }

    #[test]
    fn bootstrap_admin_needs_both_values() {
        let err = AppConfig::from_lookup(lookup(&[
            (SIGNING_SECRET_VAR, "s"),
            (BOOTSTRAP_EMAIL_VAR, "root@corp.test"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(BOOTSTRAP_PASSWORD_VAR));

        let config = AppConfig::from_lookup(lookup(&[
            (SIGNING_SECRET_VAR, "s"),
            (BOOTSTRAP_EMAIL_VAR, "root@corp.test"),
            (BOOTSTRAP_PASSWORD_VAR, "hunter22"),
        ]))
        .unwrap();
        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "root@corp.test");
        assert!(!format!("{admin:?}").contains("hunter22"));
    }
}
