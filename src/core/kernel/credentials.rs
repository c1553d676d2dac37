use crate::core::config::{ConfigError, EnvSource};
use secrecy::{ExposeSecret, Secret};
use serde::{Serialize, Serializer};
use std::env;
use std::sync::OnceLock;

/// Header carrying the tenant user id on a connection call
pub const ACCESS_KEY_HEADER: &str = "apiAccessKeyId";
/// Header carrying the tenant password on a connection call
pub const SECRET_KEY_HEADER: &str = "apiSecretAccessKey";

/// Tenant user id and password
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub user_id: String,
    pub password: Secret<String>,
}

// Never expose the password in serialization
impl Serialize for CredentialPair {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("CredentialPair", 2)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field("password", "[REDACTED]")?;
        state.end()
    }
}

impl CredentialPair {
    #[must_use]
    pub fn new(user_id: String, password: String) -> Self {
        Self {
            user_id,
            password: Secret::new(password),
        }
    }

    /// Read the default pair from the environment
    ///
    /// Expected environment variables:
    /// - `REST_API_USER_ID`
    /// - `REST_API_PASSWORD`
    pub fn from_env() -> Result<Self, ConfigError> {
        let user_var = EnvSource::var_name("rest.api.user.id");
        let password_var = EnvSource::var_name("rest.api.password");

        let user_id =
            env::var(&user_var).map_err(|_| ConfigError::MissingEnvironmentVariable(user_var))?;
        let password = env::var(&password_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(password_var))?;

        Ok(Self::new(user_id, password))
    }

    /// Get password (use carefully - exposes secret)
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Per-connection override; each field overrides independently
#[derive(Debug, Clone, Default)]
pub struct ConnectOverride {
    pub user_id: Option<String>,
    pub password: Option<Secret<String>>,
}

impl ConnectOverride {
    pub fn new(user_id: Option<String>, password: Option<String>) -> Self {
        Self {
            user_id,
            password: password.map(Secret::new),
        }
    }

    /// Neither field overrides the default
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.password.is_none()
    }
}

/// Default credentials plus an optional, set-once override
#[derive(Debug)]
pub struct Credentials {
    default: CredentialPair,
    connect: OnceLock<ConnectOverride>,
}

impl Credentials {
    pub fn new(default: CredentialPair) -> Self {
        Self {
            default,
            connect: OnceLock::new(),
        }
    }

    /// Install the override. Returns `false` if one was already set, in
    /// which case the existing override stays in effect. An empty override
    /// is accepted but not stored.
    pub fn set_override(&self, connect: ConnectOverride) -> bool {
        if connect.is_empty() {
            return true;
        }
        self.connect.set(connect).is_ok()
    }

    pub fn has_override(&self) -> bool {
        self.connect.get().is_some()
    }

    /// User id to send: the override if present, else the default
    pub fn user_id(&self) -> &str {
        self.connect
            .get()
            .and_then(|c| c.user_id.as_deref())
            .unwrap_or(&self.default.user_id)
    }

    /// Password to send: the override if present, else the default
    pub fn password(&self) -> &str {
        self.connect
            .get()
            .and_then(|c| c.password.as_ref())
            .map_or_else(|| self.default.password(), |p| p.expose_secret().as_str())
    }

    /// Authentication headers for a connection-establishing request
    pub fn auth_headers(&self) -> [(String, String); 2] {
        [
            (ACCESS_KEY_HEADER.to_string(), self.user_id().to_string()),
            (SECRET_KEY_HEADER.to_string(), self.password().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new(CredentialPair::new(
            "default_user".to_string(),
            "default_pass".to_string(),
        ))
    }

    #[test]
    fn test_default_pair_without_override() {
        let creds = credentials();
        assert!(!creds.has_override());
        assert_eq!(creds.user_id(), "default_user");
        assert_eq!(creds.password(), "default_pass");
    }

    #[test]
    fn test_full_override_takes_precedence() {
        let creds = credentials();
        assert!(creds.set_override(ConnectOverride::new(
            Some("other_user".to_string()),
            Some("other_pass".to_string()),
        )));
        assert_eq!(creds.user_id(), "other_user");
        assert_eq!(creds.password(), "other_pass");
    }

    #[test]
    fn test_fields_resolve_independently() {
        let creds = credentials();
        creds.set_override(ConnectOverride::new(Some("other_user".to_string()), None));
        assert_eq!(creds.user_id(), "other_user");
        assert_eq!(creds.password(), "default_pass");

        let creds = credentials();
        creds.set_override(ConnectOverride::new(None, Some("other_pass".to_string())));
        assert_eq!(creds.user_id(), "default_user");
        assert_eq!(creds.password(), "other_pass");
    }

    #[test]
    fn test_override_is_set_once() {
        let creds = credentials();
        assert!(creds.set_override(ConnectOverride::new(Some("first".to_string()), None)));
        assert!(!creds.set_override(ConnectOverride::new(Some("second".to_string()), None)));
        assert_eq!(creds.user_id(), "first");
    }

    #[test]
    fn test_empty_override_is_not_stored() {
        let creds = credentials();
        assert!(creds.set_override(ConnectOverride::new(None, None)));
        assert!(!creds.has_override());
        assert!(creds.set_override(ConnectOverride::new(Some("later".to_string()), None)));
        assert_eq!(creds.user_id(), "later");
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_reads_pair() {
        env::set_var("REST_API_USER_ID", "env_user");
        env::set_var("REST_API_PASSWORD", "env_pass");

        let pair = CredentialPair::from_env();

        env::remove_var("REST_API_USER_ID");
        env::remove_var("REST_API_PASSWORD");

        let pair = pair.unwrap();
        assert_eq!(pair.user_id, "env_user");
        assert_eq!(pair.password(), "env_pass");
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_requires_password() {
        env::set_var("REST_API_USER_ID", "env_user");
        env::remove_var("REST_API_PASSWORD");

        let err = CredentialPair::from_env().unwrap_err();
        env::remove_var("REST_API_USER_ID");

        assert!(matches!(
            err,
            ConfigError::MissingEnvironmentVariable(var) if var == "REST_API_PASSWORD"
        ));
    }

    #[test]
    fn test_auth_headers() {
        let headers = credentials().auth_headers();
        assert_eq!(
            headers[0],
            (ACCESS_KEY_HEADER.to_string(), "default_user".to_string())
        );
        assert_eq!(
            headers[1],
            (SECRET_KEY_HEADER.to_string(), "default_pass".to_string())
        );
    }

    #[test]
    fn test_serialization_redacts_password() {
        let pair = CredentialPair::new("user".to_string(), "hunter2".to_string());
        let json = serde_json::to_string(&pair).unwrap();
        assert!(json.contains("[REDACTED]"));
        assert!(!json.contains("hunter2"));
    }
}
