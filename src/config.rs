use crate::error::{RepoError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_CATALOG_PATH: &str = "repo.json";
pub const DEFAULT_IPA_DIR: &str = "/ipas";
pub const DEFAULT_BASE_URL: &str = "https://your-domain.com/apps";
pub const DEFAULT_REPO_NAME: &str = "My IPA Repository";
pub const DEFAULT_REPO_IDENTIFIER: &str = "com.yourname.repo";
pub const DEFAULT_DEVELOPER_NAME: &str = "Your Name";
pub const DEFAULT_MIN_OS_VERSION: &str = "14.0";

/// Settings for one updater run.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    pub catalog_path: PathBuf,
    pub ipa_dir: PathBuf,
    pub base_url: Url,
    pub repo_name: String,
    pub repo_identifier: String,
    pub developer_name: String,
    pub default_min_os_version: String,
}

/// On-disk shape of the optional TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    catalog_path: Option<PathBuf>,
    ipa_dir: Option<PathBuf>,
    base_url: Option<String>,
    repo_name: Option<String>,
    repo_identifier: Option<String>,
    developer_name: Option<String>,
    default_min_os_version: Option<String>,
}

/// Values given on the command line; these win over the config file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub ipa_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

impl RepoConfig {
    /// Resolve the effective configuration: CLI overrides, then the config file, then defaults.
    pub fn resolve(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => Self::read_file(path)?,
            None => ConfigFile::default(),
        };

        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            catalog_path: overrides
                .catalog_path
                .or(file.catalog_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            ipa_dir: overrides
                .ipa_dir
                .or(file.ipa_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IPA_DIR)),
            base_url: Self::parse_base_url(&base_url)?,
            repo_name: file
                .repo_name
                .unwrap_or_else(|| DEFAULT_REPO_NAME.to_string()),
            repo_identifier: file
                .repo_identifier
                .unwrap_or_else(|| DEFAULT_REPO_IDENTIFIER.to_string()),
            developer_name: file
                .developer_name
                .unwrap_or_else(|| DEFAULT_DEVELOPER_NAME.to_string()),
            default_min_os_version: file
                .default_min_os_version
                .unwrap_or_else(|| DEFAULT_MIN_OS_VERSION.to_string()),
        })
    }

    fn read_file(path: &Path) -> Result<ConfigFile> {
        let content = fs::read_to_string(path).map_err(|e| {
            RepoError::Config(format!("Failed to read '{}': {e}", path.display()))
        })?;

        Ok(toml::from_str(&content)?)
    }

    fn parse_base_url(url: &str) -> Result<Url> {
        let parsed =
            Url::parse(url).map_err(|e| RepoError::Config(format!("Invalid base URL '{url}': {e}")))?;

        match parsed.scheme() {
            "https" | "http" => Ok(parsed),
            scheme => Err(RepoError::Config(format!(
                "Unsupported base URL scheme: {scheme}"
            ))),
        }
    }

    /// Defaults with the catalog and archive directory pointed elsewhere.
    #[cfg(test)]
    pub fn with_paths(catalog_path: impl Into<PathBuf>, ipa_dir: impl Into<PathBuf>) -> Self {
        let overrides = ConfigOverrides {
            catalog_path: Some(catalog_path.into()),
            ipa_dir: Some(ipa_dir.into()),
            base_url: None,
        };
        Self::resolve(None, overrides).unwrap()
    }

    /// Download link for an archive: the base URL with the file name appended as one path segment.
    pub fn download_url(&self, file_name: &str) -> Result<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RepoError::Config(format!("Base URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push(file_name);
        Ok(url.to_string())
    }
}
