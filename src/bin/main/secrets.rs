//! Loads the board configuration from the secrets file.

use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
};

use wideboy_core::config::{BoardConfig, ConfigError};

pub const SECRETS_ENV: &str = "WIDEBOY_SECRETS";
const DEFAULT_SECRETS_PATH: &str = "secrets.toml";

#[derive(Debug)]
pub enum SecretsSource {
    File(PathBuf),
    Defaults(PathBuf),
}

#[derive(Debug)]
pub enum SecretsError {
    Io(PathBuf, io::Error),
    Config(PathBuf, ConfigError),
}

impl fmt::Display for SecretsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "{}: {err}", path.display()),
            Self::Config(path, err) => write!(f, "{}: {err}", path.display()),
        }
    }
}

pub fn secrets_path() -> PathBuf {
    env::var_os(SECRETS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_PATH))
}

/// Reads `path`; a missing file means "use defaults".
pub fn load(path: &Path) -> Result<(BoardConfig, SecretsSource), SecretsError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok((
                BoardConfig::default(),
                SecretsSource::Defaults(path.to_owned()),
            ));
        }
        Err(err) => return Err(SecretsError::Io(path.to_owned(), err)),
    };

    let config = BoardConfig::from_secrets(&text)
        .map_err(|err| SecretsError::Config(path.to_owned(), err))?;
    Ok((config, SecretsSource::File(path.to_owned())))
}
