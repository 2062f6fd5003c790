//! Formatting options read from a TOML file.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::formatting::Options;

/// Looked for in the working directory when no file is named explicitly.
pub const FILENAME: &str = ".erbfmt.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Parse options from TOML text. Keys left out keep their defaults.
pub fn parse_options(text: &str) -> Result<Options, toml::de::Error> {
    toml::from_str(text)
}

pub fn load_options(path: &Path) -> Result<Options, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let options = parse_options(&text).map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(?options, "loaded {}", path.display());
    Ok(options)
}

/// Options from the named file, else from `.erbfmt.toml` in the given
/// directory if there is one, else the defaults.
pub fn resolve(explicit: Option<&Path>, directory: &Path) -> Result<Options, ConfigError> {
    if let Some(path) = explicit {
        return load_options(path);
    }

    let candidate = directory.join(FILENAME);
    if candidate.is_file() {
        load_options(&candidate)
    } else {
        Ok(Options::default())
    }
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn defaults_fill_in() {
        assert_eq!(parse_options("").unwrap(), Options::default());

        let options = parse_options("width = 100\nnew-line-block = true\n").unwrap();
        assert_eq!(
            options,
            Options {
                width: 100,
                indent: 2,
                new_line_block: true,
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_options("widht = 100").is_err());
        assert!(parse_options("width = \"wide\"").is_err());
    }

    #[test]
    fn missing_files() {
        let result = load_options(Path::new("/nonexistent/erbfmt.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));

        // nothing to discover in a directory that does not exist
        let options = resolve(None, Path::new("/nonexistent")).unwrap();
        assert_eq!(options, Options::default());
    }
}
