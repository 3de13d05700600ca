use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use word_relay::{
    Dictionary, DispatchConfig, LibreTranslateProvider, RelayError, RelayResult,
    TranslationRelay, WordNormalizer,
};

pub const DEFAULT_PORT: u16 = 5002;

/// Server settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Word list to load (`RELAY_DICTIONARY`); unset means the system list
    /// when installed, else the bundled one
    pub dictionary: Option<PathBuf>,
    pub max_edit_distance: usize,
    pub dispatch: DispatchConfig,
}

impl ServerConfig {
    pub fn from_env() -> RelayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = match lookup("HOST") {
            Some(value) => value.trim().parse().map_err(|_| {
                RelayError::ConfigError(format!("HOST must be an IP address, got '{}'", value))
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse().map_err(|_| {
                RelayError::ConfigError(format!("PORT must be a valid number, got '{}'", value))
            })?,
            None => DEFAULT_PORT,
        };

        let max_edit_distance = match lookup("RELAY_MAX_EDIT_DISTANCE") {
            Some(value) => value.trim().parse().map_err(|_| {
                RelayError::ConfigError(format!(
                    "RELAY_MAX_EDIT_DISTANCE must be a number, got '{}'",
                    value
                ))
            })?,
            None => Dictionary::DEFAULT_MAX_EDIT_DISTANCE,
        };

        Ok(Self {
            host,
            port,
            dictionary: lookup("RELAY_DICTIONARY")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            max_edit_distance,
            dispatch: DispatchConfig::from_lookup(&lookup)?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Load the dictionary and backend client described by this config
    pub fn build_relay(&self) -> RelayResult<TranslationRelay> {
        let dictionary = match &self.dictionary {
            Some(path) => Dictionary::from_file(path, self.max_edit_distance)?,
            None => Dictionary::system_or_bundled(self.max_edit_distance),
        };
        let translator = LibreTranslateProvider::from_env_with_timeout(self.dispatch.call_timeout)?;

        Ok(TranslationRelay::new(
            Arc::new(translator),
            Arc::new(WordNormalizer::new(Arc::new(dictionary))),
            self.dispatch.clone(),
        ))
    }
}
