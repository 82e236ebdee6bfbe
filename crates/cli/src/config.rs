use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Name of the configuration file picked up from the working directory.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "enginelife.toml";

/// CLI configuration, read from `enginelife.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// World state file. Relative paths in a config file resolve against
    /// the file's own directory.
    pub state_path: PathBuf,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Run `Init` before a submitted mutating transaction on an empty store.
    /// The seed commits as its own transaction, so it stays in place even if
    /// the transaction that triggered it fails.
    pub seed_on_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("enginelife-state.json"),
            log_level: "warn".to_string(),
            seed_on_empty: false,
        }
    }
}

/// Load configuration from `explicit`, else `./enginelife.toml` if it
/// exists, else defaults.
pub(crate) fn load(explicit: Option<&Path>) -> Result<Config, String> {
    match explicit {
        Some(path) => load_file(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                load_file(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn load_file(path: &Path) -> Result<Config, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read config '{}': {}", path.display(), e))?;
    let mut config = parse(&text)
        .map_err(|e| format!("invalid config '{}': {}", path.display(), e))?;
    if config.state_path.is_relative() {
        if let Some(dir) = path.parent() {
            config.state_path = dir.join(&config.state_path);
        }
    }
    Ok(config)
}

fn parse(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn all_keys_are_read() {
        let config = parse(
            r#"
state_path = "/var/lib/enginelife/state.json"
log_level = "debug"
seed_on_empty = true
"#,
        )
        .unwrap();
        assert_eq!(
            config.state_path,
            PathBuf::from("/var/lib/enginelife/state.json")
        );
        assert_eq!(config.log_level, "debug");
        assert!(config.seed_on_empty);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("state_pth = \"x.json\"").unwrap_err();
        assert!(err.to_string().contains("state_pth"), "{err}");
    }

    #[test]
    fn relative_state_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enginelife.toml");
        fs::write(&path, "state_path = \"ledger.json\"\n").unwrap();

        let config = load(Some(path.as_path())).unwrap();
        assert_eq!(config.state_path, dir.path().join("ledger.json"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
        assert!(err.starts_with("cannot read config"), "{err}");
    }
}
