#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::ClientConfig;

use crate::adapters::soap::ClientOptions;
use crate::domain::model::Credentials;
use crate::utils::error::Result;

/// Source of everything needed to build a client.
pub trait ConfigProvider {
    fn credentials(&self) -> Result<Credentials>;
    fn client_options(&self) -> ClientOptions;
}
