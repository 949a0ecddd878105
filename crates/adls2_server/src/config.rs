use std::env;

use derive_setters::Setters;
use url::Url;

use crate::error::ConfigError;

/// Configuration for the Data Lake Storage Gen2 client. Immutable once
/// constructed; built once at startup and injected into every handler.
#[derive(Debug, Clone, Setters)]
#[setters(strip_option)]
pub struct Adls2Config {
    pub storage_account_name: String,
    pub storage_account_key: Option<String>,
    pub read_only: bool,
    /// Overrides the account URL, for emulators and tests.
    pub endpoint: Option<Url>,
}

impl Adls2Config {
    pub fn new(storage_account_name: impl Into<String>) -> Result<Self, ConfigError> {
        let storage_account_name = storage_account_name.into();
        if storage_account_name.is_empty() {
            return Err(ConfigError::MissingAccountName);
        }
        Ok(Self {
            storage_account_name,
            storage_account_key: None,
            read_only: true,
            endpoint: None,
        })
    }

    /// Create a configuration from environment variables, loading a `.env`
    /// file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = Self::new(env::var("AZURE_STORAGE_ACCOUNT_NAME").unwrap_or_default())?;
        config.storage_account_key = env::var("AZURE_STORAGE_ACCOUNT_KEY").ok();
        config.read_only = env::var("READ_ONLY_MODE")
            .map(|value| value.to_lowercase() == "true")
            .unwrap_or(true);
        if let Ok(endpoint) = env::var("ADLS2_ENDPOINT") {
            config.endpoint = Some(Url::parse(&endpoint)?);
        }
        Ok(config)
    }

    /// The account URL requests are issued against.
    pub fn account_endpoint(&self) -> Result<Url, ConfigError> {
        match &self.endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Ok(Url::parse(&format!(
                "https://{}.dfs.core.windows.net",
                self.storage_account_name
            ))?),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_account_name_is_rejected() {
        let actual = Adls2Config::new("");
        assert!(matches!(actual, Err(ConfigError::MissingAccountName)));
    }

    #[test]
    fn test_defaults() {
        let fixture = Adls2Config::new("myaccount").unwrap();

        assert!(fixture.read_only);
        assert_eq!(fixture.storage_account_key, None);
        assert_eq!(
            fixture.account_endpoint().unwrap().as_str(),
            "https://myaccount.dfs.core.windows.net/"
        );
    }

    #[test]
    fn test_endpoint_override() {
        let fixture = Adls2Config::new("myaccount")
            .unwrap()
            .endpoint(Url::parse("http://127.0.0.1:10000").unwrap());

        assert_eq!(
            fixture.account_endpoint().unwrap().as_str(),
            "http://127.0.0.1:10000/"
        );
    }

    #[test]
    fn test_from_env() {
        env::set_var("AZURE_STORAGE_ACCOUNT_NAME", "envaccount");
        env::set_var("AZURE_STORAGE_ACCOUNT_KEY", "secret");
        env::set_var("READ_ONLY_MODE", "False");

        let actual = Adls2Config::from_env().unwrap();
        assert_eq!(actual.storage_account_name, "envaccount");
        assert_eq!(actual.storage_account_key, Some("secret".to_string()));
        assert!(!actual.read_only);

        env::remove_var("READ_ONLY_MODE");
        let actual = Adls2Config::from_env().unwrap();
        assert!(actual.read_only);

        env::remove_var("AZURE_STORAGE_ACCOUNT_NAME");
        env::remove_var("AZURE_STORAGE_ACCOUNT_KEY");
        assert!(Adls2Config::from_env().is_err());
    }
}
