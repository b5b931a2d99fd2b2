use crate::domain::model::Parameters;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Executes a named remote operation and returns its decoded `return` element.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, operation: &str, params: &Parameters) -> Result<Value>;
}

