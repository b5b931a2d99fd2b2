//! Client for the Colissimo delivery choice (pickup point) web service.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};

pub use adapters::soap::{ClientOptions, SoapClient, SERVICE_URL};
pub use config::{ClientConfig, ConfigProvider};
pub use crate::core::delivery_choice::DeliveryChoice;
pub use crate::core::{Credentials, Parameters, PickupPoint, Transport};
pub use utils::error::{ColissimoError, Result};
