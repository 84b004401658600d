use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    options::ConversionOptions,
};

pub const DEFAULT_BIN: &str = "/usr/bin/pdftohtml";
pub const BIN_ENV: &str = "PDFTOHTML_BIN";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bin: PathBuf,
    pub options: ConversionOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bin: PathBuf::from(DEFAULT_BIN),
            options: ConversionOptions::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    bin: Option<PathBuf>,
    options: ConversionOptions,
}

impl Config {
    /// Resolves the executable path from, in order: `bin`, the config file's
    /// `bin` key, `PDFTOHTML_BIN` (a `.env` file is loaded first), and
    /// finally [`DEFAULT_BIN`]. Options come from the config file when given.
    pub fn resolve(bin: Option<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => Some(Self::load_file(path)?),
            None => None,
        };
        let (file_bin, options) = match file {
            Some(file) => (file.bin, file.options),
            None => (None, ConversionOptions::default()),
        };

        let bin = match bin.or(file_bin) {
            Some(bin) => bin,
            None => {
                dotenv::dotenv().ok();
                env::var_os(BIN_ENV)
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_BIN))
            }
        };
        tracing::debug!("Using pdftohtml at {}", bin.display());

        Ok(Self { bin, options })
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        tracing::info!("Reading config {}...", path.display());
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn explicit_bin_wins_over_config_file() {
        let file = write_config(r#"{"bin": "/opt/poppler/pdftohtml"}"#);
        let config = Config::resolve(Some("/tmp/pdftohtml".into()), Some(file.path())).unwrap();

        assert_eq!(config.bin, PathBuf::from("/tmp/pdftohtml"));
    }

    #[test]
    fn config_file_supplies_bin_and_options() {
        let file = write_config(
            r#"{"bin": "/opt/poppler/pdftohtml", "options": {"singlePage": true, "zoom": 2}}"#,
        );
        let config = Config::resolve(None, Some(file.path())).unwrap();

        assert_eq!(config.bin, PathBuf::from("/opt/poppler/pdftohtml"));
        assert!(config.options.single_page);
        assert_eq!(config.options.zoom, 2.0);
        assert!(config.options.no_frames);
    }

    #[test]
    fn unknown_option_in_config_is_rejected() {
        let file = write_config(r#"{"options": {"firstPage": 3}}"#);
        let err = Config::resolve(None, Some(file.path())).unwrap_err();

        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::resolve(None, Some(&dir.path().join("missing.json"))).unwrap_err();

        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
