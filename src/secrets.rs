//! Secret lookup
//!
//! Installers ask for secrets by name; the manager resolves them through a
//! [`SecretSource`]. The default source reads environment variables.

use crate::error::{StrataError, StrataResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env::VarError;
use tracing::debug;

/// Resolves a named secret into a JSON value
pub trait SecretSource {
    fn fetch(&self, name: &str) -> StrataResult<Value>;
}

/// Secrets from environment variables named `<prefix><name>`
///
/// Values holding valid JSON are decoded, anything else is kept as a string.
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets {
    prefix: String,
}

impl EnvSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl SecretSource for EnvSecrets {
    fn fetch(&self, name: &str) -> StrataResult<Value> {
        let variable = format!("{}{}", self.prefix, name);
        let raw = match std::env::var(&variable) {
            Ok(raw) => raw,
            Err(VarError::NotPresent) => return Err(StrataError::SecretMissing { name: variable }),
            Err(VarError::NotUnicode(_)) => return Err(StrataError::SecretNotUnicode { name: variable }),
        };
        debug!("Resolved secret {} from environment", variable);
        Ok(decode(raw))
    }
}

/// Fixed secrets, mostly for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: BTreeMap<String, Value>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }
}

impl SecretSource for StaticSecrets {
    fn fetch(&self, name: &str) -> StrataResult<Value> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| StrataError::SecretMissing {
                name: name.to_string(),
            })
    }
}

fn decode(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_secret_json_is_decoded() {
        std::env::set_var("STRATA_TEST_ARTIFACTORY", r#"{"username":"u","password":"p"}"#);
        let value = EnvSecrets::with_prefix("STRATA_TEST_").fetch("ARTIFACTORY").unwrap();
        std::env::remove_var("STRATA_TEST_ARTIFACTORY");
        assert_eq!(value, json!({"username": "u", "password": "p"}));
    }

    #[test]
    #[serial]
    fn env_secret_plain_text_is_string() {
        std::env::set_var("STRATA_TEST_TOKEN", "s3cr3t value");
        let value = EnvSecrets::with_prefix("STRATA_TEST_").fetch("TOKEN").unwrap();
        std::env::remove_var("STRATA_TEST_TOKEN");
        assert_eq!(value, json!("s3cr3t value"));
    }

    #[test]
    #[serial]
    fn env_secret_missing_names_variable() {
        std::env::remove_var("STRATA_TEST_ABSENT");
        let err = EnvSecrets::with_prefix("STRATA_TEST_").fetch("ABSENT").unwrap_err();
        assert_eq!(err.to_string(), "Missing environment variable STRATA_TEST_ABSENT");
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn env_secret_not_unicode_is_not_missing() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        std::env::set_var("STRATA_TEST_BINARY", OsString::from_vec(vec![0x66, 0x6f, 0xff]));
        let err = EnvSecrets::with_prefix("STRATA_TEST_").fetch("BINARY").unwrap_err();
        std::env::remove_var("STRATA_TEST_BINARY");
        assert!(matches!(err, StrataError::SecretNotUnicode { ref name } if name == "STRATA_TEST_BINARY"));
    }

    #[test]
    fn static_secrets_lookup() {
        let secrets = StaticSecrets::new().with("ARTIFACTORY", json!({"repository": "r"}));
        assert!(secrets.fetch("ARTIFACTORY").is_ok());
        assert!(matches!(
            secrets.fetch("OTHER"),
            Err(StrataError::SecretMissing { .. })
        ));
    }
}
