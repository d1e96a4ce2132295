use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::{DEFAULT_CONFIG_PATH, DEFAULT_SERVER_KEY, LAUNCHER_PREFIX};

/// Knobs for a single run. The binary always uses `Settings::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Location of `mcp.json`; a leading `~` is expanded before reading.
    pub config_path: String,
    /// Which entry under `mcpServers` supplies the environment.
    pub server_key: String,
    /// Program followed by the arguments placed before the pass-through ones.
    pub launcher: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            server_key: DEFAULT_SERVER_KEY.to_string(),
            launcher: LAUNCHER_PREFIX.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    pub fn resolved_config_path(&self) -> PathBuf {
        expand_home(&self.config_path)
    }
}

/// Replaces a leading `~` with the home directory. Paths that don't start with
/// `~` (or `~user` forms) come back untouched, as does everything when the home
/// directory can't be determined.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else {
        return PathBuf::from(path);
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => {
            tracing::debug!(%path, "No home directory, leaving path unexpanded");
            PathBuf::from(path)
        }
    }
}

pub fn default_config_path() -> PathBuf {
    expand_home(DEFAULT_CONFIG_PATH)
}

/// Reads and parses the MCP configuration document at `path`.
pub fn load_config(path: &Path) -> Result<Value> {
    tracing::debug!(path = %path.display(), "Loading MCP config");

    let data = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            Error::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&data).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pulls `mcpServers.<server_key>.env` out of the config. Any level that is
/// missing or isn't an object yields an empty map.
pub fn server_env(config: &Value, server_key: &str) -> BTreeMap<String, String> {
    let Some(env) = config
        .get("mcpServers")
        .and_then(|servers| servers.get(server_key))
        .and_then(|server| server.get("env"))
        .and_then(|env| env.as_object())
    else {
        tracing::debug!(%server_key, "No env block for server");
        return BTreeMap::new();
    };

    env.iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key.clone(), s.clone())),
            Value::Number(_) | Value::Bool(_) => Some((key.clone(), value.to_string())),
            _ => {
                tracing::warn!(%key, %value, "Skipping env entry that is not a scalar");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn returns_env_block_unmodified() {
        let config = json!({
            "mcpServers": {
                "giizhendam-aabajichiganan-mcp": {
                    "command": "node",
                    "env": {
                        "OPENROUTER_API_KEY": "sk-or-123",
                        "AIDER_MODEL": "openrouter/google/gemini-2.5-pro-exp-03-25:free"
                    }
                },
                "other": { "env": { "SHOULD_NOT": "leak" } }
            }
        });

        let env = server_env(&config, DEFAULT_SERVER_KEY);
        let expected: BTreeMap<String, String> = [
            ("AIDER_MODEL", "openrouter/google/gemini-2.5-pro-exp-03-25:free"),
            ("OPENROUTER_API_KEY", "sk-or-123"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(env, expected);
    }

    #[test]
    fn missing_structure_degrades_to_empty() {
        let cases = [
            json!({}),
            json!({ "mcpServers": {} }),
            json!({ "mcpServers": { "giizhendam-aabajichiganan-mcp": {} } }),
            json!({ "mcpServers": { "giizhendam-aabajichiganan-mcp": { "env": null } } }),
            json!({ "mcpServers": ["not", "an", "object"] }),
            json!({ "mcpServers": { "giizhendam-aabajichiganan-mcp": { "env": "FOO=1" } } }),
            json!([1, 2, 3]),
            json!("just a string"),
        ];
        for config in cases {
            assert!(
                server_env(&config, DEFAULT_SERVER_KEY).is_empty(),
                "expected empty env for {config}"
            );
        }
    }

    #[test]
    fn scalar_values_are_stringified_and_others_skipped() {
        let config = json!({
            "mcpServers": {
                "aider": {
                    "env": {
                        "RETRIES": 3,
                        "VERBOSE": true,
                        "NESTED": { "a": 1 },
                        "LIST": ["x"],
                        "NOTHING": null
                    }
                }
            }
        });

        let env = server_env(&config, "aider");
        assert_eq!(env.len(), 2);
        assert_eq!(env["RETRIES"], "3");
        assert_eq!(env["VERBOSE"], "true");
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        assert_eq!(expand_home("/etc/mcp.json"), PathBuf::from("/etc/mcp.json"));
        assert_eq!(expand_home("relative/~/x"), PathBuf::from("relative/~/x"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(
                expand_home("~/.cursor/mcp.json"),
                home.join(".cursor").join("mcp.json")
            );
            assert_eq!(default_config_path(), home.join(".cursor/mcp.json"));
        }
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "server_key": "my-aider" }"#).unwrap();
        assert_eq!(settings.server_key, "my-aider");
        assert_eq!(settings.config_path, DEFAULT_CONFIG_PATH);
        assert_eq!(
            settings.launcher,
            vec!["uv", "run", "--", "python", "-m", "aider.main"]
        );
    }
}
