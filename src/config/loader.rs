//! Loads patch definitions from TOML, either inline or from a file on
//! disk. Deserialization and validation happen together, so a returned
//! [`PatchConfig`] is always ready to apply.

use crate::config::schema::{PatchConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a set of patch definitions came from, for diagnostics.
#[derive(Debug, Clone)]
pub enum Origin {
    Inline,
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Inline => write!(f, "inline patch definitions"),
            Origin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read patch definitions from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{origin} is not valid patch-definition TOML: {source}")]
    Parse {
        origin: Origin,
        source: toml_edit::de::Error,
    },

    #[error("{origin} failed validation: {source}")]
    Invalid {
        origin: Origin,
        source: ValidationError,
    },
}

/// Parse and validate patch definitions held in memory.
pub fn load_from_str(input: &str) -> Result<PatchConfig, ConfigError> {
    load(input, Origin::Inline)
}

/// Read, parse and validate a patch-definition file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<PatchConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load(&contents, Origin::File(path.to_path_buf()))
}

fn load(input: &str, origin: Origin) -> Result<PatchConfig, ConfigError> {
    let config: PatchConfig = toml_edit::de::from_str(input).map_err(|source| {
        ConfigError::Parse {
            origin: origin.clone(),
            source,
        }
    })?;
    config
        .validate()
        .map_err(|source| ConfigError::Invalid { origin, source })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Format;
    use crate::value::ValueKind;

    const EXAMPLE: &str = r#"
[meta]
name = "hytale-server"

[[file]]
path = "config/server.json"
format = "json"

  [[file.replace]]
  match = "ServerName"
  kind = "string"
  value = "Updated Server Name"

  [[file.replace]]
  match = "MaxPlayers"
  kind = "numeric"
  value = "50"

[[file]]
path = "server.properties"
format = "properties"

  [[file.replace]]
  match = "motd"
  kind = "string"
  value = "Welcome"
"#;

    #[test]
    fn test_load_example_config() {
        let config = load_from_str(EXAMPLE).unwrap();
        assert_eq!(config.meta.name, "hytale-server");
        assert_eq!(config.files.len(), 2);
        assert_eq!(config.files[0].format, Format::Json);
        assert_eq!(config.files[0].replacements[1].kind, ValueKind::Numeric);
        assert_eq!(config.files[1].format, Format::Properties);
    }

    #[test]
    fn test_empty_config_fails_validation() {
        let result = load_from_str("[meta]\nname = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_bad_selector_fails_validation() {
        let input = r#"
[[file]]
path = "a.json"
format = "json"

  [[file.replace]]
  match = "a..b"
  kind = "string"
  value = "v"
"#;
        assert!(matches!(
            load_from_str(input),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_bad_numeric_literal_fails_validation() {
        let input = r#"
[[file]]
path = "a.json"
format = "json"

  [[file.replace]]
  match = "a"
  kind = "numeric"
  value = "not-a-number"
"#;
        assert!(matches!(
            load_from_str(input),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_unknown_format_fails_to_parse() {
        let input = "[[file]]\npath = \"a.conf\"\nformat = \"hocon\"\n";
        assert!(matches!(load_from_str(input), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_file_errors_name_their_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patches.toml");
        std::fs::write(&path, "not = valid [ toml").unwrap();

        let message = load_from_path(&path).unwrap_err().to_string();
        assert!(message.contains("patches.toml"), "{message}");

        let missing = load_from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
