//! Loading caller identities from files.

use std::fs;
use std::path::Path;

use tradegate_abac::StaticIdentityProvider;

use crate::ConfigError;

/// Reads an identity file. `.toml` files are parsed as TOML, anything else as JSON.
pub fn load_identity(path: impl AsRef<Path>) -> Result<StaticIdentityProvider, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&contents).map_err(|source| ConfigError::JsonError {
            path: path.to_path_buf(),
            source,
        })
    }
}
