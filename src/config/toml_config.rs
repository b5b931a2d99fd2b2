use crate::adapters::soap::{ClientOptions, DEFAULT_TIMEOUT_SECS, SERVICE_URL};
use crate::config::ConfigProvider;
use crate::domain::model::Credentials;
use crate::utils::error::{ColissimoError, Result};
use crate::utils::validation::{
    validate_no_placeholder, validate_non_empty_string, validate_positive_number,
    validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub login: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ColissimoError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ColissimoError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COLISSIMO_PASSWORD})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ColissimoError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let login = validate_required_field("credentials.login", &self.credentials.login)?;
        validate_non_empty_string("credentials.login", login)?;
        validate_no_placeholder("credentials.login", login)?;

        let password = validate_required_field("credentials.password", &self.credentials.password)?;
        validate_non_empty_string("credentials.password", password)?;
        validate_no_placeholder("credentials.password", password)?;

        validate_url("service.endpoint", self.endpoint())?;
        validate_positive_number("service.timeout_seconds", self.timeout_seconds(), 1)?;

        Ok(())
    }

    /// 取得服務端點
    pub fn endpoint(&self) -> &str {
        self.service.endpoint.as_deref().unwrap_or(SERVICE_URL)
    }

    /// 取得請求逾時秒數
    pub fn timeout_seconds(&self) -> u64 {
        self.service.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

impl ConfigProvider for ClientConfig {
    fn credentials(&self) -> Result<Credentials> {
        let login = validate_required_field("credentials.login", &self.credentials.login)?;
        let password = validate_required_field("credentials.password", &self.credentials.password)?;
        Credentials::new(login.clone(), password.clone())
    }

    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            endpoint: self.endpoint().to_string(),
            timeout: Duration::from_secs(self.timeout_seconds()),
            user_agent: self.service.user_agent.clone(),
        }
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[credentials]
login = "123456"
password = "secret"

[service]
endpoint = "https://ws.example.com/PointRetraitServiceWS/2.0"
timeout_seconds = 10
user_agent = "colissimo-client-tests"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint(), "https://ws.example.com/PointRetraitServiceWS/2.0");
        assert_eq!(config.timeout_seconds(), 10);

        let options = config.client_options();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.user_agent.as_deref(), Some("colissimo-client-tests"));
        assert_eq!(config.credentials().unwrap().login(), "123456");
    }

    #[test]
    fn test_service_section_is_optional() {
        let toml_content = r#"
[credentials]
login = "123456"
password = "secret"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint(), SERVICE_URL);
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_COLISSIMO_PASSWORD", "from-env");

        let toml_content = r#"
[credentials]
login = "123456"
password = "${TEST_COLISSIMO_PASSWORD}"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.credentials.password.as_deref(), Some("from-env"));

        std::env::remove_var("TEST_COLISSIMO_PASSWORD");
    }

    #[test]
    fn test_unresolved_env_var_fails_validation() {
        let toml_content = r#"
[credentials]
login = "${TEST_COLISSIMO_UNSET_LOGIN}"
password = "secret"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ColissimoError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let invalid_endpoint = r#"
[credentials]
login = "123456"
password = "secret"

[service]
endpoint = "invalid-url"
"#;
        let config = ClientConfig::from_toml_str(invalid_endpoint).unwrap();
        assert!(config.validate().is_err());

        let zero_timeout = r#"
[credentials]
login = "123456"
password = "secret"

[service]
timeout_seconds = 0
"#;
        let config = ClientConfig::from_toml_str(zero_timeout).unwrap();
        assert!(config.validate().is_err());

        let missing_password = r#"
[credentials]
login = "123456"
"#;
        let config = ClientConfig::from_toml_str(missing_password).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ColissimoError::MissingConfigError { .. })
        ));
        assert!(config.credentials().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = ClientConfig::from_toml_str(
            r#"
[credentials]
login = "123456"
password = "secret"
"#,
        )
        .unwrap();

        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[credentials]
login = "file-login"
password = "file-password"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ClientConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.credentials.login.as_deref(), Some("file-login"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            ClientConfig::from_file("/nonexistent/colissimo.toml"),
            Err(ColissimoError::IoError(_))
        ));
    }
}
