//! Build configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. Built-in defaults
//! 2. User config: `~/.config/qawhaq/config.toml` (XDG) or platform config dir
//! 3. Project config: `qawhaq.toml` (or `--config <file>`)
//! 4. Environment variables: `QAWHAQ_*` (nested keys split on `__`)
//! 5. Command-line flags
//!
//! ```toml
//! data_dir = "data"
//! out_dir = "build"
//! languages = ["de", "sv"]
//! report_format = "json"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use qawhaq_export::locales::{LANGUAGES, SUPPORTED_LOCALES};
use qawhaq_export::ExportOptions;
use serde::{Deserialize, Serialize};

pub const PROJECT_CONFIG_FILE: &str = "qawhaq.toml";
pub const ENV_PREFIX: &str = "QAWHAQ_";
pub const VERSION_FILE: &str = "VERSION";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildConfig {
    pub data_dir: PathBuf,
    /// Relative paths are taken from `data_dir`.
    pub sources_file: PathBuf,
    /// Relative paths are taken from `data_dir`.
    pub out_dir: PathBuf,
    /// Falls back to `<data_dir>/VERSION`, then `"0"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub languages: Vec<String>,
    pub supported_locales: Vec<String>,
    pub report_format: ReportFormat,
    pub fail_on_error: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            sources_file: PathBuf::from("sources.yaml"),
            out_dir: PathBuf::from("build"),
            version: None,
            languages: LANGUAGES.iter().map(|l| l.to_string()).collect(),
            supported_locales: SUPPORTED_LOCALES.iter().map(|l| l.to_string()).collect(),
            report_format: ReportFormat::Text,
            fail_on_error: true,
        }
    }
}

/// Values given on the command line; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_format: Option<ReportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_error: Option<bool>,
}

impl BuildConfig {
    /// Every layer except the command line.
    pub fn figment(project_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(BuildConfig::default()))
            .merge(Toml::file(Self::user_config_path()))
            .merge(Toml::file(project_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(project_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let project_file = project_file.unwrap_or(Path::new(PROJECT_CONFIG_FILE));
        let figment = Self::figment(project_file).merge(Serialized::defaults(overrides));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment.extract().context("invalid qawhaq configuration")
    }

    /// User config path: ~/.config/qawhaq/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("qawhaq").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("qawhaq").join("config.toml"))
            .unwrap_or_default()
    }

    fn under_data_dir(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn sources_path(&self) -> PathBuf {
        self.under_data_dir(&self.sources_file)
    }

    pub fn out_path(&self) -> PathBuf {
        self.under_data_dir(&self.out_dir)
    }

    pub fn resolved_version(&self) -> String {
        if let Some(version) = &self.version {
            return version.clone();
        }
        std::fs::read_to_string(self.data_dir.join(VERSION_FILE))
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "0".to_string())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            version: self.resolved_version(),
            languages: self.languages.clone(),
            supported_locales: self.supported_locales.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layered(toml: &str, overrides: &ConfigOverrides) -> BuildConfig {
        let figment = Figment::from(Serialized::defaults(BuildConfig::default()))
            .merge(Toml::string(toml))
            .merge(Serialized::defaults(overrides));
        BuildConfig::from_figment(figment).expect("config")
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = layered("", &ConfigOverrides::default());
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.sources_path(), PathBuf::from("./sources.yaml"));
        assert_eq!(config.languages.len(), 8);
        assert_eq!(config.supported_locales, vec!["de", "en", "sv"]);
        assert_eq!(config.report_format, ReportFormat::Text);
        assert!(config.fail_on_error);
    }

    #[test]
    fn project_file_then_flags() {
        let toml = "data_dir = \"lexicon\"\nreport_format = \"json\"\nlanguages = [\"de\"]\n";
        let config = layered(toml, &ConfigOverrides::default());
        assert_eq!(config.out_path(), PathBuf::from("lexicon/build"));
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(config.languages, vec!["de"]);

        let flags = ConfigOverrides {
            report_format: Some(ReportFormat::Text),
            fail_on_error: Some(false),
            ..ConfigOverrides::default()
        };
        let config = layered(toml, &flags);
        assert_eq!(config.report_format, ReportFormat::Text);
        assert!(!config.fail_on_error);
        assert_eq!(config.data_dir, PathBuf::from("lexicon"));
    }

    #[test]
    fn version_falls_back_to_file_then_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = BuildConfig {
            data_dir: dir.path().to_path_buf(),
            ..BuildConfig::default()
        };
        assert_eq!(config.resolved_version(), "0");

        std::fs::write(dir.path().join(VERSION_FILE), "2026.10.14\n").expect("write");
        assert_eq!(config.resolved_version(), "2026.10.14");

        config.version = Some("dev".to_string());
        assert_eq!(config.export_options().version, "dev");
    }
}
