use crate::adapters::soap::envelope::build_request;
use crate::adapters::soap::parser::parse_response;
use crate::domain::model::{Credentials, Parameters};
use crate::domain::ports::Transport;
use crate::utils::error::{ColissimoError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const SERVICE_URL: &str =
    "https://ws.colissimo.fr/pointretrait-ws-cxf/PointRetraitServiceWS/2.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound on how much of an unexpected body ends up in an error.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Transport settings for [`SoapClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: SERVICE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }
}

impl ClientOptions {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// SOAP 1.1 over HTTP. Each instance owns its own connection pool.
pub struct SoapClient {
    client: Client,
    credentials: Credentials,
    endpoint: String,
}

impl SoapClient {
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        validate_url("endpoint", &options.endpoint)?;

        let mut builder = Client::builder().timeout(options.timeout);
        if let Some(user_agent) = options.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(Self {
            client: builder.build()?,
            credentials,
            endpoint: options.endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for SoapClient {
    async fn invoke(&self, operation: &str, params: &Parameters) -> Result<Value> {
        let body = build_request(operation, &self.credentials, params)?;

        tracing::debug!(
            "Invoking {} at {} with {} parameter(s)",
            operation,
            self.endpoint,
            params.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("SOAP response status: {}", status);
        let text = response.text().await?;

        match parse_response(&text) {
            Ok(value) if status.is_success() => Ok(value),
            Err(fault @ ColissimoError::SoapFault { .. }) => Err(fault),
            Err(err) if status.is_success() => Err(err),
            _ => Err(ColissimoError::UnexpectedStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("123456", "secret").unwrap()
    }

    #[test]
    fn test_default_options_target_colissimo() {
        let options = ClientOptions::default();
        assert_eq!(options.endpoint, SERVICE_URL);
        assert_eq!(options.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_new_rejects_malformed_endpoint() {
        let options = ClientOptions::default().with_endpoint("not a url");
        assert!(matches!(
            SoapClient::new(credentials(), options),
            Err(ColissimoError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_new_keeps_endpoint() {
        let options = ClientOptions::default().with_endpoint("http://localhost:8080/ws");
        let client = SoapClient::new(credentials(), options).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/ws");
    }
}
