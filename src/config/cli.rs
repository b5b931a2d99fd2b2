use crate::config::ClientConfig;
use crate::domain::model::{format_shipping_date, Parameters};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "colissimo.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "colissimo")]
#[command(about = "Look up Colissimo pickup points")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file (defaults to ./colissimo.toml when present)")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "COLISSIMO_LOGIN")]
    pub login: Option<String>,

    #[arg(long, env = "COLISSIMO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, help = "Override the service endpoint")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Search pickup points around a location
    Find {
        city: String,
        zip_code: String,
        #[arg(default_value = "FR")]
        country_code: String,
        #[arg(long, help = "DD/MM/YYYY, defaults to today")]
        shipping_date: Option<String>,
        #[arg(long = "option", value_parser = parse_key_val, help = "Extra request parameter as key=value")]
        options: Vec<(String, String)>,
    },
    /// Fetch a pickup point by its identifier
    Get {
        id: u64,
        #[arg(long, help = "DD/MM/YYYY, defaults to today")]
        shipping_date: Option<String>,
        #[arg(long = "option", value_parser = parse_key_val, help = "Extra request parameter as key=value")]
        options: Vec<(String, String)>,
    },
}

impl Command {
    pub fn shipping_date(&self) -> String {
        let explicit = match self {
            Command::Find { shipping_date, .. } | Command::Get { shipping_date, .. } => {
                shipping_date.clone()
            }
        };
        explicit.unwrap_or_else(|| format_shipping_date(chrono::Local::now().date_naive()))
    }

    pub fn extra_options(&self) -> Parameters {
        match self {
            Command::Find { options, .. } | Command::Get { options, .. } => {
                options.iter().cloned().collect()
            }
        }
    }
}

impl CliConfig {
    /// Loads the configuration file, then applies command line overrides.
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() => {
                ClientConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => ClientConfig::default(),
        };

        if let Some(login) = &self.login {
            config.credentials.login = Some(login.clone());
        }
        if let Some(password) = &self.password {
            config.credentials.password = Some(password.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.service.endpoint = Some(endpoint.clone());
        }

        Ok(config)
    }
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;

    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_find_command() {
        let cli = CliConfig::try_parse_from([
            "colissimo",
            "--login",
            "123456",
            "find",
            "Paris",
            "75001",
            "FR",
            "--shipping-date",
            "12/06/2024",
            "--option",
            "weight=1500",
            "--option",
            "city=Lyon",
        ])
        .unwrap();

        assert_eq!(cli.login.as_deref(), Some("123456"));
        assert_eq!(cli.command.shipping_date(), "12/06/2024");

        let options = cli.command.extra_options();
        assert_eq!(options.get("weight"), Some("1500"));
        assert_eq!(options.get("city"), Some("Lyon"));
    }

    #[test]
    fn test_parse_get_command_defaults_shipping_date_to_today() {
        let cli = CliConfig::try_parse_from(["colissimo", "get", "875071"]).unwrap();

        match &cli.command {
            Command::Get { id, .. } => assert_eq!(*id, 875071),
            other => panic!("expected get, got {:?}", other),
        }

        let today = format_shipping_date(chrono::Local::now().date_naive());
        assert_eq!(cli.command.shipping_date(), today);
    }

    #[test]
    fn test_invalid_option_is_rejected() {
        assert!(CliConfig::try_parse_from(["colissimo", "get", "1", "--option", "weight"]).is_err());
        assert!(CliConfig::try_parse_from(["colissimo", "get", "1", "--option", "=1"]).is_err());
    }

    #[test]
    fn test_resolve_applies_overrides_on_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[credentials]
login = "file-login"
password = "file-password"

[service]
timeout_seconds = 5
"#,
            )
            .unwrap();

        let path = temp_file.path().to_str().unwrap();
        let cli = CliConfig::try_parse_from([
            "colissimo",
            "--config",
            path,
            "--login",
            "cli-login",
            "--endpoint",
            "http://localhost:9000/ws",
            "get",
            "1",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.credentials.login.as_deref(), Some("cli-login"));
        assert_eq!(config.credentials.password.as_deref(), Some("file-password"));
        assert_eq!(config.endpoint(), "http://localhost:9000/ws");
        assert_eq!(config.timeout_seconds(), 5);
    }
}
