use crate::utils::error::{ColissimoError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Login/password pair used to authenticate every call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    login: String,
    password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let login = login.into();
        let password = password.into();

        if login.trim().is_empty() {
            return Err(ColissimoError::InvalidCredentials {
                reason: "login cannot be empty".to_string(),
            });
        }
        if password.trim().is_empty() {
            return Err(ColissimoError::InvalidCredentials {
                reason: "password cannot be empty".to_string(),
            });
        }

        Ok(Self { login, password })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Insertion-ordered named parameters sent with a remote operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overwrites an existing key in place, appends otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Applies `overrides` on top of `self`: on collision the override wins.
    pub fn merge(mut self, overrides: Parameters) -> Self {
        for (key, value) in overrides.entries {
            self.insert(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Formats a date the way the service expects it (`DD/MM/YYYY`).
pub fn format_shipping_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// One decoded remote record, keyed by element name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(ColissimoError::InvalidField {
                field: field.to_string(),
                value: other.to_string(),
                reason: "expected a structured record".to_string(),
            }),
        }
    }
}

/// Decoded status of a remote result envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    Success(Map<String, Value>),
    Failure { code: i64, message: String },
}

impl RemoteOutcome {
    /// Reads `errorCode` / `errorMessage` from the `return` element.
    pub fn from_return(value: Value) -> Result<Self> {
        let data = Record::from_value("return", value)?.data;

        let raw_code = data.get("errorCode").ok_or_else(|| ColissimoError::MissingField {
            field: "errorCode".to_string(),
        })?;
        let code = parse_error_code(raw_code)?;

        if code == 0 {
            return Ok(Self::Success(data));
        }

        let message = data
            .get("errorMessage")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self::Failure { code, message })
    }

    pub fn into_result(self) -> Result<Map<String, Value>> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure { code, message } => Err(ColissimoError::RemoteError { code, message }),
        }
    }
}

fn parse_error_code(raw: &Value) -> Result<i64> {
    let parsed = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| ColissimoError::InvalidField {
        field: "errorCode".to_string(),
        value: raw.to_string(),
        reason: "expected an integer".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_reject_blank_values() {
        assert!(Credentials::new("123456", "secret").is_ok());
        assert!(matches!(
            Credentials::new("", "secret"),
            Err(ColissimoError::InvalidCredentials { .. })
        ));
        assert!(matches!(
            Credentials::new("123456", "  "),
            Err(ColissimoError::InvalidCredentials { .. })
        ));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("123456", "secret").unwrap();
        let debug = format!("{:?}", credentials);

        assert!(debug.contains("123456"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_parameters_merge_overrides_in_place() {
        let defaults = Parameters::new()
            .with("city", "Paris")
            .with("zipCode", "75001");
        let overrides = Parameters::new().with("weight", "1000").with("city", "Lyon");

        let merged = defaults.merge(overrides);
        let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();

        assert_eq!(keys, vec!["city", "zipCode", "weight"]);
        assert_eq!(merged.get("city"), Some("Lyon"));
        assert_eq!(merged.get("zipCode"), Some("75001"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_parameters_from_iter_keeps_last_value() {
        let params: Parameters = vec![("lang", "FR"), ("lang", "EN")].into_iter().collect();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("lang"), Some("EN"));
    }

    #[test]
    fn test_format_shipping_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(format_shipping_date(date), "03/06/2024");
    }

    #[test]
    fn test_remote_outcome_success() {
        let outcome = RemoteOutcome::from_return(json!({
            "errorCode": "0",
            "errorMessage": "Code retour OK",
        }))
        .unwrap();

        assert!(matches!(outcome, RemoteOutcome::Success(_)));
    }

    #[test]
    fn test_remote_outcome_failure_ignores_payload() {
        let outcome = RemoteOutcome::from_return(json!({
            "errorCode": "301",
            "errorMessage": "Le code postal est invalide",
            "pointRetraitAcheminement": {"identifiant": "1"}
        }))
        .unwrap();

        assert_eq!(
            outcome,
            RemoteOutcome::Failure {
                code: 301,
                message: "Le code postal est invalide".to_string()
            }
        );

        let err = outcome.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to request delivery points: Le code postal est invalide"
        );
    }

    #[test]
    fn test_remote_outcome_requires_numeric_error_code() {
        assert!(matches!(
            RemoteOutcome::from_return(json!({"errorMessage": "?"})),
            Err(ColissimoError::MissingField { .. })
        ));
        assert!(matches!(
            RemoteOutcome::from_return(json!({"errorCode": "abc"})),
            Err(ColissimoError::InvalidField { .. })
        ));
    }
}
