use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;
    use usage_ingest::config::Config;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        // Test logging defaults
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "console");

        // Test ingest defaults
        assert_eq!(config.ingest.error_log, PathBuf::from("usage-errors.log"));
        assert_eq!(
            config.ingest.accepted_output,
            PathBuf::from("usage-accepted.jsonl")
        );
        assert_eq!(config.ingest.accounts_file, None);

        // Test output defaults
        assert!(!config.output.json_pretty);
        assert_eq!(config.output.timestamp_format, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn test_env_variable_override() {
        env::set_var("LOG_LEVEL", "DEBUG");
        env::set_var("USAGE_INGEST_ERROR_LOG", "/tmp/rejected.log");
        env::set_var("USAGE_INGEST_ACCOUNTS", "/tmp/accounts.json");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.logging.level, "DEBUG");
        assert_eq!(config.ingest.error_log, PathBuf::from("/tmp/rejected.log"));
        assert_eq!(
            config.ingest.accounts_file,
            Some(PathBuf::from("/tmp/accounts.json"))
        );

        // Cleanup
        env::remove_var("LOG_LEVEL");
        env::remove_var("USAGE_INGEST_ERROR_LOG");
        env::remove_var("USAGE_INGEST_ACCOUNTS");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Test valid config
        assert!(config.validate().is_ok());

        // Invalid log output
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());

        // Empty error log path
        config = Config::default();
        config.ingest.error_log = PathBuf::new();
        assert!(config.validate().is_err());

        // Blank timestamp format
        config = Config::default();
        config.output.timestamp_format = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_creates_log_directory_for_file_output() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let log_dir = temp_dir.path().join("logs");

        let mut config = Config::default();
        config.logging.output = "file".to_string();
        config.paths.log_directory = log_dir.clone();

        assert!(config.validate().is_ok());
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_config_file_loading() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test-config.toml");

        let test_config = r#"
[logging]
level = "DEBUG"
format = "json"
output = "file"

[ingest]
error_log = "/var/log/usage/errors.log"
accepted_output = "/var/spool/usage/accepted.jsonl"
accounts_file = "/etc/usage/accounts.json"

[output]
json_pretty = true
timestamp_format = "%Y/%m/%d %H:%M"

[paths]
log_directory = "/custom/logs"
        "#;

        fs::write(&config_path, test_config).expect("Failed to write test config");

        let config = Config::load_from_file(&config_path).expect("Failed to load config");

        assert_eq!(config.logging.level, "DEBUG");
        assert_eq!(config.logging.format, "json");
        assert_eq!(
            config.ingest.error_log,
            PathBuf::from("/var/log/usage/errors.log")
        );
        assert_eq!(
            config.ingest.accounts_file,
            Some(PathBuf::from("/etc/usage/accounts.json"))
        );
        assert!(config.output.json_pretty);
        assert_eq!(config.output.timestamp_format, "%Y/%m/%d %H:%M");
    }

    #[test]
    fn test_config_file_without_accounts() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("minimal.toml");

        let test_config = r#"
[logging]
level = "INFO"
format = "pretty"
output = "console"

[ingest]
error_log = "errors.log"
accepted_output = "accepted.jsonl"

[output]
json_pretty = false
timestamp_format = "%H:%M:%S"

[paths]
log_directory = "logs"
        "#;

        fs::write(&config_path, test_config).expect("Failed to write test config");

        let config = Config::load_from_file(&config_path).expect("Failed to load config");
        assert_eq!(config.ingest.accounts_file, None);
    }

    #[test]
    fn test_config_save_and_reload() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("saved.toml");

        let mut config = Config::default();
        config.ingest.accounts_file = Some(PathBuf::from("accounts.json"));
        config.save_to_file(&config_path).expect("Failed to save config");

        let toml_string = fs::read_to_string(&config_path).expect("Failed to read config");
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("[ingest]"));
        assert!(toml_string.contains("[output]"));
        assert!(toml_string.contains("[paths]"));

        let reloaded = Config::load_from_file(&config_path).expect("Failed to reload config");
        assert_eq!(reloaded.ingest.accounts_file, config.ingest.accounts_file);
        assert_eq!(reloaded.logging.level, config.logging.level);
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[logging\nlevel = ").expect("Failed to write test config");

        assert!(Config::load_from_file(&config_path).is_err());
        assert!(Config::load_from_file(&temp_dir.path().join("missing.toml")).is_err());
    }
}
