#[cfg(test)]
mod tests {
    use crate::config::{load_config, server_env};
    use crate::{Error, DEFAULT_SERVER_KEY};
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("mcp.json");
        let mut file = File::create(&config_path).unwrap();
        let json = r#"
        {
            "mcpServers": {
                "giizhendam-aabajichiganan-mcp": {
                    "command": "node",
                    "args": ["dist/index.js"],
                    "env": {
                        "OPENROUTER_API_KEY": "sk-or-abc",
                        "DEFAULT_ARCHITECT_MODEL": "openrouter/google/gemini-2.5-pro-exp-03-25:free"
                    }
                }
            }
        }
        "#;
        file.write_all(json.as_bytes()).unwrap();

        let config = load_config(&config_path).unwrap();
        let env = server_env(&config, DEFAULT_SERVER_KEY);
        assert_eq!(env.len(), 2);
        assert_eq!(env["OPENROUTER_API_KEY"], "sk-or-abc");
    }

    #[test]
    fn test_load_config_missing_file() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("nope.json");

        let err = load_config(&config_path).unwrap_err();
        assert!(matches!(&err, Error::ConfigNotFound { path } if *path == config_path));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains(config_path.to_str().unwrap()));
    }

    #[test]
    fn test_load_config_truncated_json() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("mcp.json");
        std::fs::write(&config_path, "{").unwrap();

        let err = load_config(&config_path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().starts_with("Could not decode JSON from"));
    }

    #[test]
    fn test_load_config_directory_is_read_error() {
        let tmp_dir = tempdir().unwrap();

        let err = load_config(tmp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }), "unexpected: {err:?}");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_load_config_accepts_any_json_root() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("mcp.json");
        std::fs::write(&config_path, "[1, 2, 3]").unwrap();

        let config = load_config(&config_path).unwrap();
        assert!(server_env(&config, DEFAULT_SERVER_KEY).is_empty());
    }
}
