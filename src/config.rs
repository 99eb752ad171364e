use std::fs;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::Principal;
use crate::error::FetchGraphError;
use crate::fetch::DataSetFetchOptions;

pub const DEFAULT_CONFIG_FILE: &str = "fetchgraph.json";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub snapshot: Option<Utf8PathBuf>,
    #[serde(default)]
    pub principal: Option<String>,
    #[serde(default)]
    pub fetch: Option<DataSetFetchOptions>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub snapshot: Option<Utf8PathBuf>,
    pub principal: Principal,
    pub fetch: DataSetFetchOptions,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, FetchGraphError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(FetchGraphError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| FetchGraphError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| FetchGraphError::ConfigParse(err.to_string()))?;

        let base_dir = Utf8PathBuf::from_path_buf(config_path.clone())
            .map_err(|_| FetchGraphError::Filesystem("config path is not UTF-8".to_string()))?
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default();

        Self::resolve_config(config, &base_dir)
    }

    /// Applies defaults; a relative snapshot path is taken relative to `base_dir`.
    pub fn resolve_config(
        config: Config,
        base_dir: &Utf8Path,
    ) -> Result<ResolvedConfig, FetchGraphError> {
        let schema_version = config.schema_version.unwrap_or(SCHEMA_VERSION);
        if schema_version != SCHEMA_VERSION {
            return Err(FetchGraphError::UnsupportedSchema(schema_version));
        }

        let snapshot = config.snapshot.map(|snapshot| {
            if snapshot.is_absolute() {
                snapshot
            } else {
                base_dir.join(snapshot)
            }
        });

        let principal = config
            .principal
            .filter(|user| !user.trim().is_empty())
            .map(Principal::new)
            .unwrap_or_default();

        Ok(ResolvedConfig {
            schema_version,
            snapshot,
            principal,
            fetch: config.fetch.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default(), Utf8Path::new("")).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.principal, Principal::default());
        assert!(resolved.snapshot.is_none());
        assert!(resolved.fetch.requested().is_empty());
    }

    #[test]
    fn snapshot_is_relative_to_config_dir() {
        let config = Config {
            snapshot: Some(Utf8PathBuf::from("data/snapshot.json")),
            ..Config::default()
        };
        let resolved = ConfigLoader::resolve_config(config, Utf8Path::new("/srv/lab")).unwrap();
        assert_eq!(
            resolved.snapshot.unwrap(),
            Utf8PathBuf::from("/srv/lab/data/snapshot.json")
        );
    }
}
