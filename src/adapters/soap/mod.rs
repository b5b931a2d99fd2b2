pub mod client;
pub mod envelope;
pub mod parser;

pub use client::{ClientOptions, SoapClient, DEFAULT_TIMEOUT_SECS, SERVICE_URL};
