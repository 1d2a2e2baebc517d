//! Input loading for the ronda CLI.

use crate::cmd::Format;
use anyhow::{Context, Result};
use ronda_traits::{CompanyData, sample::reference_company};
use serde::de::DeserializeOwned;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Global inputs shared by every valuation command.
#[derive(Debug)]
pub(crate) struct Inputs {
    pub(crate) data: Option<PathBuf>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) format: Format,
}

impl Inputs {
    /// Company snapshot from `--data`, or the reference company.
    pub(crate) fn company(&self) -> Result<CompanyData> {
        load_company(self.data.as_deref())
    }

    /// Model configuration from `--config` merged over the defaults.
    pub(crate) fn config<T: DeserializeOwned + Default>(&self) -> Result<T> {
        match &self.config {
            Some(path) => {
                let raw = read(path)?;
                parse_config(&raw).with_context(|| format!("invalid config in {}", path.display()))
            }
            None => Ok(T::default()),
        }
    }
}

/// Load a company snapshot, falling back to the reference company.
pub(crate) fn load_company(path: Option<&Path>) -> Result<CompanyData> {
    let Some(path) = path else {
        debug!("no snapshot given, using the reference company");
        return Ok(reference_company());
    };
    let raw = read(path)?;
    let data = parse_company(&raw)
        .with_context(|| format!("invalid company snapshot in {}", path.display()))?;
    debug!(symbol = data.symbol(), periods = data.periods(), "loaded snapshot");
    Ok(data)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_company(raw: &str) -> Result<CompanyData> {
    Ok(serde_json::from_str(raw)?)
}

fn parse_config<T: DeserializeOwned>(raw: &str) -> Result<T> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_models::intrinsic::DcfConfig;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: DcfConfig = parse_config(r#"{"terminal_growth": 0.03}"#).unwrap();
        assert_eq!(config.terminal_growth, 0.03);
        assert_eq!(config.projection_years, DcfConfig::default().projection_years);
        assert!(config.wacc.is_none());
    }

    #[test]
    fn test_snapshot_from_json() {
        let raw = serde_json::to_string(&reference_company()).unwrap();
        let data = parse_company(&raw).unwrap();
        assert_eq!(data, reference_company());
    }

    #[test]
    fn test_missing_path_uses_reference() {
        let data = load_company(None).unwrap();
        assert_eq!(data.symbol(), reference_company().symbol());
    }

    #[test]
    fn test_unreadable_file() {
        let err = load_company(Some(Path::new("/nonexistent/ronda.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(parse_company("{\"profile\": 1}").is_err());
    }
}
